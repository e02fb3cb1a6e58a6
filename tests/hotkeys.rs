use eframe::egui;

use mitoselect::data::hotkeys::{Hotkey, Modifier, SelectorKeys};

#[test]
fn parse_plain_and_modified_keys() {
    assert_eq!("Escape".parse::<Hotkey>().unwrap(), Hotkey::new(Modifier::None, "Escape"));
    assert_eq!("Ctrl+Enter".parse::<Hotkey>().unwrap(), Hotkey::new(Modifier::Ctrl, "Enter"));
    assert_eq!(
        "shift + ctrl + Z".parse::<Hotkey>().unwrap(),
        Hotkey::new(Modifier::CtrlShift, "Z")
    );
}

#[test]
fn parse_rejects_unknown_keys_and_modifiers() {
    assert!("".parse::<Hotkey>().is_err());
    assert!("Ctrl+NotAKey".parse::<Hotkey>().is_err());
    assert!("Hyper+Enter".parse::<Hotkey>().is_err());
}

#[test]
fn display_round_trips_through_parse() {
    for s in ["Enter", "Ctrl+Enter", "Alt+Shift+Escape"] {
        let hk: Hotkey = s.parse().unwrap();
        assert_eq!(hk.to_string().parse::<Hotkey>().unwrap(), hk);
    }
}

#[test]
fn modifier_matching_is_exact() {
    assert!(Modifier::Shift.matches(&egui::Modifiers::SHIFT));
    assert!(!Modifier::Shift.matches(&egui::Modifiers::NONE));
    assert!(!Modifier::Shift.matches(&(egui::Modifiers::SHIFT | egui::Modifiers::CTRL)));
    assert!(Modifier::None.matches(&egui::Modifiers::NONE));
    assert!(Modifier::CtrlShift.matches(&(egui::Modifiers::SHIFT | egui::Modifiers::CTRL)));
}

#[test]
fn command_counts_as_ctrl() {
    let m = egui::Modifiers {
        command: true,
        mac_cmd: true,
        ..Default::default()
    };
    assert!(Modifier::Ctrl.matches(&m));
}

#[test]
fn default_keys_resolve_to_egui_keys() {
    let keys = SelectorKeys::default();
    assert_eq!(keys.finish.egui_key(), Some(egui::Key::Enter));
    assert_eq!(keys.cancel.egui_key(), Some(egui::Key::Escape));
    let help = keys.help_text();
    assert!(help.contains("Enter"));
    assert!(help.contains("Escape"));
}
