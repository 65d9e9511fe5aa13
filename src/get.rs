//! Film retrieval by id or exact title (`films get <KEY>`).

use anyhow::Result;
use std::io::Write;

use crate::display;
use crate::Catalog;

pub async fn run_get(catalog: &Catalog, key: &str, json: bool) -> Result<()> {
    let film = catalog.finder.find_by_key(key).await;

    if json {
        return crate::search::print_json(&film);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    display::render_film(&mut out, film.as_ref())?;
    out.flush()?;
    Ok(())
}
