//! Component trait: the building block for every screen and panel.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Lifecycle: `init` → (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Called once when mounted. Components that spawn requests keep the
    /// sender to report results back to the app loop.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a key press. Return an Action to dispatch, or None.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// While true, every key goes to the component (open form, search box)
    /// and global shortcuts are suspended.
    fn captures_input(&self) -> bool {
        false
    }

    /// Set focus state. Screens start loading when first focused.
    fn set_focused(&mut self, _focused: bool) {}

    /// Name used in logs.
    fn id(&self) -> &str;
}
