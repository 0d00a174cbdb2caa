//! Browser front end for pore-core.
//!
//! The host page creates one [`MechanismPanel`] per canvas and a single
//! [`EorDashboard`]. After `generate()` settles, the page forwards
//! `is_loading()` to every panel, then `visual_error()` when set and
//! `config_json()` otherwise.

use wasm_bindgen::prelude::*;

mod canvas;
mod fetch;
mod frame;
mod logger;
mod panel;

pub use fetch::EorDashboard;
pub use panel::MechanismPanel;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}
