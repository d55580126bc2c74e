use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lyrisync_core::{SyncConfig, UserCommand};

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    CycleAlignment,
    Engine(UserCommand),
}

/// Key bindings, with offset nudges sized from the `[sync]` config
#[derive(Debug, Clone, Copy)]
pub struct KeyMap {
    step_ms: i64,
    jump_ms: i64,
}

impl KeyMap {
    #[must_use]
    pub const fn new(sync: &SyncConfig) -> Self {
        Self {
            step_ms: sync.offset_step_ms,
            jump_ms: sync.offset_jump_ms,
        }
    }

    #[must_use]
    pub fn action(&self, key: KeyEvent) -> Option<KeyAction> {
        use KeyAction::{CycleAlignment, Engine, Quit};

        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Quit),
                _ => None,
            };
        }

        let action = match key.code {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => Quit,
            KeyCode::Up | KeyCode::Char('k') => Engine(UserCommand::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Engine(UserCommand::ScrollDown),
            KeyCode::PageUp => Engine(UserCommand::PageUp),
            KeyCode::PageDown => Engine(UserCommand::PageDown),
            KeyCode::Char('c' | ' ') | KeyCode::Enter => Engine(UserCommand::Recenter),
            KeyCode::Char('+' | '=') => Engine(UserCommand::ShiftOffset(self.step_ms)),
            KeyCode::Char('-' | '_') => Engine(UserCommand::ShiftOffset(-self.step_ms)),
            KeyCode::Char(']') => Engine(UserCommand::ShiftOffset(self.jump_ms)),
            KeyCode::Char('[') => Engine(UserCommand::ShiftOffset(-self.jump_ms)),
            KeyCode::Char('0') => Engine(UserCommand::ResetOffset),
            KeyCode::Char('a') => CycleAlignment,
            _ => return None,
        };
        Some(action)
    }
}
