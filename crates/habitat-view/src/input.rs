//! Browser-neutral input vocabulary and default key bindings.

use crate::gizmo::GizmoMode;
use crate::rig::MoveKey;

/// Pointer travel (NDC units) below which a press/release counts as a click
pub const CLICK_TOLERANCE: f32 = 0.01;
/// Orbit radians per NDC unit of pointer travel
pub const ROTATE_SPEED: f32 = std::f32::consts::PI;
/// Pan factor per NDC unit, multiplied by the orbit distance
pub const PAN_SPEED: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// DOM `MouseEvent.button` numbering
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(PointerButton::Primary),
            1 => Some(PointerButton::Middle),
            2 => Some(PointerButton::Secondary),
            _ => None,
        }
    }
}

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(MoveKey),
    ResetCamera,
    GizmoMode(GizmoMode),
}

/// Default bindings keyed by DOM `KeyboardEvent.key`
pub fn key_action(key: &str) -> Option<KeyAction> {
    let action = match key {
        "ArrowUp" => KeyAction::Move(MoveKey::Forward),
        "ArrowDown" => KeyAction::Move(MoveKey::Back),
        "ArrowLeft" => KeyAction::Move(MoveKey::Left),
        "ArrowRight" => KeyAction::Move(MoveKey::Right),
        _ => match key.to_ascii_lowercase().as_str() {
            "w" => KeyAction::Move(MoveKey::Forward),
            "s" => KeyAction::Move(MoveKey::Back),
            "a" => KeyAction::Move(MoveKey::Left),
            "d" => KeyAction::Move(MoveKey::Right),
            "e" => KeyAction::Move(MoveKey::Up),
            "q" => KeyAction::Move(MoveKey::Down),
            "r" => KeyAction::ResetCamera,
            "t" | "1" => KeyAction::GizmoMode(GizmoMode::Translate),
            "y" | "2" => KeyAction::GizmoMode(GizmoMode::Rotate),
            "u" | "3" => KeyAction::GizmoMode(GizmoMode::Scale),
            _ => return None,
        },
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasd_and_arrows_agree() {
        assert_eq!(key_action("w"), key_action("ArrowUp"));
        assert_eq!(key_action("S"), Some(KeyAction::Move(MoveKey::Back)));
        assert_eq!(key_action("ArrowLeft"), key_action("a"));
        assert_eq!(key_action("e"), Some(KeyAction::Move(MoveKey::Up)));
        assert_eq!(key_action("q"), Some(KeyAction::Move(MoveKey::Down)));
    }

    #[test]
    fn test_gizmo_shortcuts() {
        assert_eq!(key_action("2"), Some(KeyAction::GizmoMode(GizmoMode::Rotate)));
        assert_eq!(key_action("U"), Some(KeyAction::GizmoMode(GizmoMode::Scale)));
        assert_eq!(key_action("r"), Some(KeyAction::ResetCamera));
        assert_eq!(key_action("Escape"), None);
    }

    #[test]
    fn test_dom_buttons() {
        assert_eq!(PointerButton::from_dom(0), Some(PointerButton::Primary));
        assert_eq!(PointerButton::from_dom(2), Some(PointerButton::Secondary));
        assert_eq!(PointerButton::from_dom(5), None);
    }
}
