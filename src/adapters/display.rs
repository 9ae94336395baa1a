//! Headless operator display.
//!
//! Logs the item line whenever it changes.  Used when no window can be
//! shown (`show_window = false` or no display server).

use log::info;

use crate::app::ports::{DisplayPort, OperatorInput};
use crate::fsm::context::Presentation;
use crate::vision::Frame;

#[derive(Default)]
pub struct LogDisplay {
    last_item: Option<String>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, _frame: &Frame, view: &Presentation) -> OperatorInput {
        let item = view.item_text();
        if self.last_item.as_deref() != Some(item.as_str()) {
            info!("{item} | {}", view.status.text());
            self.last_item = Some(item);
        }
        OperatorInput::None
    }
}
