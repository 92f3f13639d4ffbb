#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{StickerData, TextDecoration};
use crate::surface::recording::{Op, RecordingSurface};

// =============================================================
// Helpers
// =============================================================

/// Pointer sample at a card-space position. The default viewport maps the
/// card 1:1 onto a 480x320 surface at the screen origin.
fn at(x: f64, y: f64) -> PointerSample {
    PointerSample::mouse(Point::new(x + 240.0, y + 160.0), 0.0)
}

fn at_time(x: f64, y: f64, time_ms: f64) -> PointerSample {
    PointerSample::mouse(Point::new(x + 240.0, y + 160.0), time_ms)
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

fn ctrl() -> Modifiers {
    Modifiers { ctrl: true, ..Modifiers::default() }
}

fn sticker(id: &str, x: f64, y: f64) -> Decoration {
    let data = StickerData { url: String::new(), color: "#ff0000".into(), scale: 1.0 };
    let mut dec = Decoration::new(x, y, DecorationData::Sticker(data));
    dec.id = DecorationId::new(id);
    dec
}

fn text_dec(id: &str, x: f64, y: f64, body: &str) -> Decoration {
    let mut dec = Decoration::new(x, y, DecorationData::Text(TextData { text: body.into(), ..TextData::default() }));
    dec.id = DecorationId::new(id);
    dec
}

fn drawing_dec(id: &str, points: Vec<[f64; 2]>) -> Decoration {
    let data = DrawingData { paths: vec![points], ..DrawingData::default() };
    let mut dec = Decoration::new(0.0, 0.0, DecorationData::Drawing(data));
    dec.id = DecorationId::new(id);
    dec
}

fn front(decorations: Vec<Decoration>) -> FaceDecorations {
    FaceDecorations { front: decorations, back: Vec::new() }
}

fn core_with(decorations: Vec<Decoration>) -> EngineCore {
    let mut core = EngineCore::default();
    core.load(front(decorations));
    core.take_frame_request();
    core
}

fn id(raw: &str) -> DecorationId {
    DecorationId::new(raw)
}

fn ids(core: &EngineCore) -> Vec<&str> {
    core.store.face(Face::Front).iter().map(|d| d.id.as_str()).collect()
}

fn position(core: &EngineCore, raw: &str) -> (f64, f64) {
    let dec = core.store.get(Face::Front, &id(raw)).unwrap();
    (dec.x, dec.y)
}

/// Click and release on a decoration with the select tool.
fn click(core: &mut EngineCore, x: f64, y: f64) {
    core.on_pointer_down(at(x, y));
    core.on_pointer_up(at(x, y));
}

fn begin_edit(actions: &[Action]) -> Option<&TextEditRequest> {
    actions.iter().find_map(|a| match a {
        Action::BeginTextEdit(req) => Some(req),
        _ => None,
    })
}

// =============================================================
// Stickers
// =============================================================

#[test]
fn sticker_tool_stamps_armed_sticker() {
    let mut core = EngineCore::default();
    core.arm_catalog_sticker("heart");
    core.set_tool(Tool::Sticker);
    let actions = core.on_pointer_down(at(0.0, 0.0));

    assert!(actions.contains(&Action::DecorationsChanged));
    let placed = &core.store.face(Face::Front)[0];
    assert_eq!((placed.x, placed.y), (0.0, 0.0));
    assert_eq!(placed.scale, Some(0.5));
    assert_eq!(placed.rotation, Some(0.0));
    let DecorationData::Sticker(data) = &placed.data else {
        panic!("expected sticker");
    };
    assert!(data.url.starts_with("data:image/svg+xml;base64,"));
    assert_eq!(data.color, "#ff6b6b");
    assert!(core.can_undo());
}

#[test]
fn sticker_tool_ignores_occupied_spot() {
    let mut core = EngineCore::default();
    core.arm_catalog_sticker("star");
    core.set_tool(Tool::Sticker);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_up(at(0.0, 0.0));
    core.on_pointer_down(at(5.0, 5.0));
    core.on_pointer_up(at(5.0, 5.0));
    assert_eq!(core.store.face(Face::Front).len(), 1);
    core.on_pointer_down(at(100.0, 0.0));
    assert_eq!(core.store.face(Face::Front).len(), 2);
}

#[test]
fn sticker_tool_without_armed_sticker_does_nothing() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Sticker);
    let actions = core.on_pointer_down(at(0.0, 0.0));
    assert!(!actions.contains(&Action::DecorationsChanged));
    assert!(core.decorations().is_empty());
}

#[test]
fn unknown_catalog_id_disarms() {
    let mut core = EngineCore::default();
    core.arm_catalog_sticker("heart");
    assert!(core.ui.armed_sticker.is_some());
    core.arm_catalog_sticker("nope");
    assert!(core.ui.armed_sticker.is_none());
}

// =============================================================
// Text
// =============================================================

#[test]
fn text_tool_creates_placeholder_and_starts_editing() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    let actions = core.on_pointer_down(at(10.0, 10.0));

    let req = begin_edit(&actions).unwrap();
    assert_eq!(req.anchor, Point::new(250.0, 170.0));
    assert_eq!(req.data.text, core.config.placeholder_text);
    assert_eq!(core.input.editing_id(), Some(&req.id));
    assert_eq!(core.selection().map(|s| &s.id), Some(&req.id));
    // The placeholder is never persisted.
    assert!(core.export().is_empty());
}

#[test]
fn typing_then_commit_records_text() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(10.0, 10.0));
    core.on_text_input("H");
    core.on_text_input("Hi");
    let actions = core.commit_text_edit();

    assert!(actions.iter().any(|a| matches!(a, Action::EndTextEdit { .. })));
    assert!(actions.contains(&Action::DecorationsChanged));
    let exported = core.export();
    assert_eq!(exported.front.len(), 1);
    assert_eq!(exported.front[0].text().unwrap().text, "Hi");
    assert!(core.input.is_idle());

    // One undo removes the whole text; redo brings it back.
    core.undo();
    assert!(core.decorations().is_empty());
    core.redo();
    assert_eq!(core.decorations().front[0].text().unwrap().text, "Hi");
}

#[test]
fn undoing_typed_text_leaves_nothing_to_undo() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(10.0, 10.0));
    core.on_text_input("Hi");
    core.commit_text_edit();

    let actions = core.undo();
    assert!(actions.contains(&Action::DecorationsChanged));
    assert!(core.decorations().is_empty());
    assert!(!core.can_undo(), "the placeholder state is not a separate step");
    assert!(core.undo().is_empty());
}

#[test]
fn live_typing_does_not_touch_history() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(0.0, 0.0));
    let before = core.store.history().len();
    core.on_text_input("a");
    core.on_text_input("ab");
    assert_eq!(core.store.history().len(), before);
    assert_eq!(core.decorations().front[0].text().unwrap().text, "ab");
}

#[test]
fn blank_commit_removes_text() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_text_input("   ");
    let actions = core.commit_text_edit();
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.decorations().is_empty());
}

#[test]
fn untouched_placeholder_is_discarded_on_tool_change() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(0.0, 0.0));
    assert_eq!(core.decorations().len(), 1);
    core.set_tool(Tool::Select);
    assert!(core.decorations().is_empty());
    assert!(core.selection().is_none());
}

#[test]
fn enter_commits_and_escape_also_deselects() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_text_input("Hello");
    core.on_key_down(&Key::new("Enter"), no_modifiers());
    assert!(core.input.is_idle());
    assert!(core.selection().is_some());

    core.on_pointer_down(at_time(0.0, 0.0, 5_000.0));
    assert!(core.input.editing_id().is_some(), "second click on selected text edits it");
    core.on_text_input("Hello there");
    let actions = core.on_key_down(&Key::new("Escape"), no_modifiers());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert_eq!(core.decorations().front[0].text().unwrap().text, "Hello there");
}

#[test]
fn shift_enter_does_not_commit() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_key_down(&Key::new("Enter"), Modifiers { shift: true, ..Modifiers::default() });
    assert!(core.input.editing_id().is_some());
}

#[test]
fn editing_keys_do_not_reach_shortcuts() {
    let mut core = core_with(vec![text_dec("t", 0.0, 0.0, "Hi")]);
    core.on_double_click(at(0.0, 0.0));
    assert!(core.input.editing_id().is_some());
    core.on_key_down(&Key::new("Backspace"), no_modifiers());
    assert_eq!(core.decorations().len(), 1);
}

#[test]
fn double_click_edits_existing_text() {
    let mut core = core_with(vec![text_dec("t", 20.0, 0.0, "Hi")]);
    let actions = core.on_double_click(at(20.0, 0.0));
    let req = begin_edit(&actions).unwrap();
    assert_eq!(req.id, id("t"));
    assert_eq!(req.data.text, "Hi");
    assert_eq!(core.selection().map(|s| s.id.clone()), Some(id("t")));
}

#[test]
fn double_tap_with_text_tool_edits() {
    let mut core = core_with(vec![text_dec("t", 0.0, 0.0, "Hi")]);
    core.set_tool(Tool::Text);
    core.on_pointer_down(at_time(0.0, 0.0, 1_000.0));
    core.on_pointer_up(at_time(0.0, 0.0, 1_050.0));
    assert!(core.input.is_idle());
    core.on_pointer_down(at_time(2.0, 2.0, 1_200.0));
    assert_eq!(core.input.editing_id(), Some(&id("t")));
}

#[test]
fn double_click_ignores_non_text() {
    let mut core = core_with(vec![sticker("s", 0.0, 0.0)]);
    let actions = core.on_double_click(at(0.0, 0.0));
    assert!(begin_edit(&actions).is_none());
}

#[test]
fn text_settings_restyle_selected_text() {
    let mut core = core_with(vec![text_dec("t", 0.0, 0.0, "Hi")]);
    click(&mut core, 0.0, 0.0);
    let settings = TextSettings { font_size: 40.0, text_decoration: TextDecoration::Underline, ..TextSettings::default() };
    let actions = core.set_text_settings(settings);
    assert!(actions.contains(&Action::DecorationsChanged));
    let data = core.decorations().front[0].text().unwrap();
    assert_eq!(data.font_size, 40.0);
    assert_eq!(data.text_decoration, TextDecoration::Underline);
    assert_eq!(data.text, "Hi");
}

// =============================================================
// Drawing
// =============================================================

#[test]
fn draw_tool_commits_stroke_on_release() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Draw);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_move(at(10.0, 0.0));
    core.on_pointer_move(at(10.0, 10.0));
    assert!(core.scene().live_stroke.is_some());
    assert!(core.decorations().is_empty());
    let actions = core.on_pointer_up(at(10.0, 10.0));

    assert!(actions.contains(&Action::DecorationsChanged));
    let dec = &core.decorations().front[0];
    assert_eq!((dec.x, dec.y), (0.0, 0.0));
    let DecorationData::Drawing(data) = &dec.data else {
        panic!("expected drawing");
    };
    assert_eq!(data.paths, vec![vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]]);
    assert_eq!(data.color, "#000000");
    assert!(core.scene().live_stroke.is_none());
}

#[test]
fn single_point_stroke_is_dropped() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Draw);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_up(at(0.0, 0.0));
    assert!(core.decorations().is_empty());
    assert!(!core.can_undo());
}

#[test]
fn pointer_leave_finishes_stroke() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Draw);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_move(at(20.0, 0.0));
    core.on_pointer_leave();
    assert_eq!(core.decorations().len(), 1);
}

#[test]
fn second_touch_drops_live_stroke() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Draw);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_move(at(20.0, 0.0));
    core.on_pointer_move(PointerSample::touch(Point::new(260.0, 160.0), 2, 0.0));
    core.on_pointer_up(at(20.0, 0.0));
    assert!(core.decorations().is_empty());
}

#[test]
fn smoothing_is_applied_to_committed_stroke() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Draw);
    core.set_draw_settings(DrawSettings { smoothing: 1, ..DrawSettings::default() });
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_move(at(10.0, 9.0));
    core.on_pointer_move(at(20.0, 0.0));
    core.on_pointer_up(at(20.0, 0.0));
    let DecorationData::Drawing(data) = &core.decorations().front[0].data else {
        panic!("expected drawing");
    };
    assert_eq!(data.paths[0][1], [10.0, 3.0]);
}

#[test]
fn draw_settings_recolor_selected_drawing() {
    let mut core = core_with(vec![drawing_dec("d", vec![[0.0, 0.0], [30.0, 0.0]])]);
    click(&mut core, 0.0, 0.0);
    let actions = core.set_draw_settings(DrawSettings { color: "#ff0000".into(), line_width: 6.0, smoothing: 0 });
    assert!(actions.contains(&Action::DecorationsChanged));
    let DecorationData::Drawing(data) = &core.decorations().front[0].data else {
        panic!("expected drawing");
    };
    assert_eq!(data.color, "#ff0000");
    assert_eq!(data.line_width, 6.0);
}

// =============================================================
// Select, drag, delete
// =============================================================

#[test]
fn click_selects_and_empty_click_deselects() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    let actions = core.on_pointer_down(at(0.0, 0.0));
    assert!(actions.contains(&Action::SelectionChanged(Some(Selection { face: Face::Front, id: id("a") }))));
    core.on_pointer_up(at(0.0, 0.0));
    let actions = core.on_pointer_down(at(200.0, 100.0));
    assert!(actions.contains(&Action::SelectionChanged(None)));
}

#[test]
fn drag_moves_and_commits_once() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    core.on_pointer_down(at(5.0, 5.0));
    for step in 1..=10_i32 {
        core.on_pointer_move(at(5.0 + f64::from(step) * 3.0, 5.0 + f64::from(step) * 2.0));
    }
    assert!(!core.can_undo(), "no history during the drag");
    let actions = core.on_pointer_up(at(35.0, 25.0));
    assert!(actions.contains(&Action::DecorationsChanged));
    assert_eq!(position(&core, "a"), (30.0, 20.0));
    assert_eq!(core.store.history().len(), 2);

    core.undo();
    assert_eq!(position(&core, "a"), (0.0, 0.0));
    assert!(core.selection().is_none());
}

#[test]
fn dragging_a_drawing_keeps_it_under_the_pointer() {
    let mut core = core_with(vec![drawing_dec("d", vec![[0.0, 0.0], [30.0, 0.0]])]);
    core.on_pointer_down(at(1.0, 0.0));
    core.on_pointer_move(at(21.0, 10.0));
    core.on_pointer_up(at(21.0, 10.0));
    assert_eq!(position(&core, "d"), (20.0, 10.0));
    let DecorationData::Drawing(data) = &core.decorations().front[0].data else {
        panic!("expected drawing");
    };
    assert_eq!(data.paths, vec![vec![[20.0, 10.0], [50.0, 10.0]]]);

    // Grabbable at its new place, no longer at the old one.
    core.on_pointer_down(at(200.0, 100.0));
    core.on_pointer_up(at(200.0, 100.0));
    let actions = core.on_pointer_down(at(50.0, 10.0));
    assert!(actions.contains(&Action::SelectionChanged(Some(Selection { face: Face::Front, id: id("d") }))));
}

#[test]
fn drag_preserves_z_order() {
    let mut core = core_with(vec![sticker("a", -100.0, 0.0), sticker("b", 0.0, 0.0), sticker("c", 100.0, 0.0)]);
    core.on_pointer_down(at(-100.0, 0.0));
    core.on_pointer_move(at(90.0, 0.0));
    core.on_pointer_up(at(90.0, 0.0));
    assert_eq!(ids(&core), vec!["a", "b", "c"]);
    assert_eq!(position(&core, "a"), (90.0, 0.0));
}

#[test]
fn topmost_decoration_is_picked() {
    let mut core = core_with(vec![sticker("below", 0.0, 0.0), sticker("above", 10.0, 0.0)]);
    core.on_pointer_down(at(5.0, 0.0));
    assert_eq!(core.selection().map(|s| s.id.clone()), Some(id("above")));
}

#[test]
fn click_without_move_records_nothing() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    assert!(!core.can_undo());
}

#[test]
fn second_touch_cancels_drag() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_move(at(30.0, 0.0));
    assert_eq!(position(&core, "a"), (30.0, 0.0));
    core.on_pointer_down(PointerSample::touch(Point::new(300.0, 160.0), 2, 0.0));
    assert_eq!(position(&core, "a"), (0.0, 0.0));
    assert!(core.input.is_idle());
    core.on_pointer_up(at(30.0, 0.0));
    assert!(!core.can_undo());
}

#[test]
fn escape_cancels_drag_and_deselects() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_move(at(30.0, 0.0));
    core.on_key_down(&Key::new("Escape"), no_modifiers());
    assert_eq!(position(&core, "a"), (0.0, 0.0));
    assert!(core.selection().is_none());
}

#[test]
fn delete_affordance_removes_selected() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    // Outline padding 8 around a 64px sticker puts the affordance at (40, -40).
    let actions = core.on_pointer_down(at(40.0, -40.0));
    assert!(actions.contains(&Action::DecorationsChanged));
    assert!(core.decorations().is_empty());
    assert!(core.selection().is_none());
}

#[test]
fn delete_affordance_inactive_without_chrome() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    core.set_tool(Tool::Text);
    core.on_pointer_down(at(40.0, -40.0));
    // Created a text instead of deleting the sticker.
    assert!(core.store.get(Face::Front, &id("a")).is_some());
}

#[test]
fn delete_key_removes_selection() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0), sticker("b", 100.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    core.on_key_down(&Key::new("Delete"), no_modifiers());
    assert_eq!(ids(&core), vec!["b"]);
    click(&mut core, 100.0, 0.0);
    core.on_key_down(&Key::new("Backspace"), no_modifiers());
    assert!(core.decorations().is_empty());
}

#[test]
fn hover_sets_grab_cursor() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    let actions = core.on_pointer_move(at(0.0, 0.0));
    assert!(actions.contains(&Action::SetCursor("grab".into())));
    let actions = core.on_pointer_down(at(0.0, 0.0));
    assert!(actions.contains(&Action::SetCursor("grabbing".into())));
    core.on_pointer_up(at(0.0, 0.0));
    let actions = core.on_pointer_move(at(200.0, 100.0));
    assert!(actions.contains(&Action::SetCursor("default".into())));
}

#[test]
fn tool_cursors() {
    let mut core = EngineCore::default();
    assert!(core.set_tool(Tool::Draw).contains(&Action::SetCursor("crosshair".into())));
    assert!(core.set_tool(Tool::Text).contains(&Action::SetCursor("text".into())));
    assert!(core.set_tool(Tool::Sticker).contains(&Action::SetCursor("default".into())));
    assert!(core.arm_catalog_sticker("sun").contains(&Action::SetCursor("crosshair".into())));
    assert_eq!(core.cursor(), "crosshair");
}

#[test]
fn pointer_outside_card_is_ignored() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    let actions = core.on_pointer_down(PointerSample::mouse(Point::new(-50.0, 10.0), 0.0));
    assert!(actions.is_empty());
}

#[test]
fn secondary_button_is_ignored() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    let mut sample = at(0.0, 0.0);
    sample.button = Button::Secondary;
    assert!(core.on_pointer_down(sample).is_empty());
    assert!(core.selection().is_none());
}

#[test]
fn scale_selected_is_one_history_step() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    assert!(core.scale_selected(-1.0).is_empty());
    core.scale_selected(2.0);
    assert_eq!(core.store.get(Face::Front, &id("a")).unwrap().scale, Some(2.0));
    assert_eq!(core.store.history().len(), 2);
}

// =============================================================
// Keyboard: nudge, clipboard, history
// =============================================================

#[test]
fn arrow_nudges_coalesce_into_one_step() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    let right = Key::new("ArrowRight");
    for _ in 0..3 {
        core.on_key_down(&right, no_modifiers());
    }
    assert_eq!(position(&core, "a"), (3.0, 0.0));
    assert!(!core.can_undo());
    core.on_key_up(&right, no_modifiers());
    assert_eq!(core.store.history().len(), 2);

    core.undo();
    assert_eq!(position(&core, "a"), (0.0, 0.0));
}

#[test]
fn shift_arrow_uses_large_step() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    core.on_key_down(&Key::new("ArrowUp"), Modifiers { shift: true, ..Modifiers::default() });
    assert_eq!(position(&core, "a"), (0.0, -10.0));
}

#[test]
fn arrows_without_selection_do_nothing() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    core.on_key_down(&Key::new("ArrowLeft"), no_modifiers());
    assert_eq!(position(&core, "a"), (0.0, 0.0));
}

#[test]
fn copy_paste_cascades() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    assert!(!core.copy());
    click(&mut core, 0.0, 0.0);
    core.on_key_down(&Key::new("c"), ctrl());
    core.on_key_down(&Key::new("v"), ctrl());
    core.on_key_down(&Key::new("v"), ctrl());

    let decs = core.store.face(Face::Front);
    assert_eq!(decs.len(), 3);
    assert_eq!((decs[1].x, decs[1].y), (20.0, 20.0));
    assert_eq!((decs[2].x, decs[2].y), (40.0, 40.0));
    assert_ne!(decs[1].id, decs[2].id);
    assert_eq!(core.selection().map(|s| s.id.clone()), Some(decs[2].id.clone()));
}

#[test]
fn paste_with_empty_clipboard_is_noop() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    assert!(!core.paste().contains(&Action::DecorationsChanged));
    assert_eq!(core.decorations().len(), 1);
}

#[test]
fn paste_targets_active_face() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    core.copy();
    core.set_face(Face::Back, 0.0);
    core.tick(1_000.0);
    core.paste();
    assert_eq!(core.store.face(Face::Back).len(), 1);
    assert_eq!(core.store.face(Face::Front).len(), 1);
}

#[test]
fn duplicate_offsets_and_selects_copy() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    core.on_key_down(&Key::new("d"), ctrl());
    let decs = core.store.face(Face::Front);
    assert_eq!(decs.len(), 2);
    assert_eq!((decs[1].x, decs[1].y), (20.0, 20.0));
    assert_eq!(core.selection().map(|s| s.id.clone()), Some(decs[1].id.clone()));
}

#[test]
fn undo_redo_shortcuts() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    core.on_key_down(&Key::new("Delete"), no_modifiers());
    assert!(core.decorations().is_empty());

    core.on_key_down(&Key::new("z"), ctrl());
    assert_eq!(core.decorations().len(), 1);
    core.on_key_down(&Key::new("Z"), Modifiers { meta: true, shift: true, ..Modifiers::default() });
    assert!(core.decorations().is_empty());
    core.on_key_down(&Key::new("z"), ctrl());
    core.on_key_down(&Key::new("y"), ctrl());
    assert!(core.decorations().is_empty());
    assert!(!core.can_redo());
}

#[test]
fn undo_then_new_edit_drops_redo() {
    let mut core = EngineCore::default();
    core.arm_catalog_sticker("heart");
    core.set_tool(Tool::Sticker);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_down(at(100.0, 0.0));
    core.undo();
    assert!(core.can_redo());
    core.on_pointer_down(at(-100.0, 0.0));
    assert!(!core.can_redo());
    assert_eq!(core.decorations().len(), 2);
}

// =============================================================
// Load / export
// =============================================================

#[test]
fn load_resets_selection_editing_and_history() {
    let mut core = core_with(vec![text_dec("t", 0.0, 0.0, "Hi")]);
    core.on_double_click(at(0.0, 0.0));
    let actions = core.load(front(vec![sticker("s", 0.0, 0.0)]));
    assert!(actions.contains(&Action::EndTextEdit { id: id("t") }));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.input.is_idle());
    assert!(!core.can_undo());
    assert_eq!(ids(&core), vec!["s"]);
}

#[test]
fn export_excludes_placeholders_only() {
    let placeholder = EngineConfig::default().placeholder_text;
    let core = core_with(vec![text_dec("p", 0.0, 0.0, &placeholder), sticker("s", 50.0, 0.0)]);
    let exported = core.export();
    assert_eq!(exported.front.len(), 1);
    assert_eq!(exported.front[0].id, id("s"));
}

// =============================================================
// Faces and flipping
// =============================================================

#[test]
fn flip_switches_display_after_duration() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    let actions = core.set_face(Face::Back, 0.0);
    assert!(actions.contains(&Action::FlipStarted { to: Face::Back }));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.is_flipping());
    assert_eq!(core.active_face(), Face::Back);
    assert_eq!(core.display_face(), Face::Front);

    assert!(core.tick(599.0).is_empty());
    let actions = core.tick(600.0);
    assert!(actions.contains(&Action::FlipFinished { face: Face::Back }));
    assert!(!core.is_flipping());
    assert_eq!(core.display_face(), Face::Back);
    assert_eq!(core.scene().face, Face::Back);
}

#[test]
fn pointer_ignored_while_flipping() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    core.set_face(Face::Back, 0.0);
    assert!(core.on_pointer_down(at(0.0, 0.0)).is_empty());
    assert!(core.on_pointer_move(at(5.0, 0.0)).is_empty());
    assert!(core.on_double_click(at(0.0, 0.0)).is_empty());
    assert!(core.selection().is_none());
}

#[test]
fn face_change_mid_flip_retargets() {
    let mut core = EngineCore::default();
    core.set_face(Face::Back, 0.0);
    let actions = core.set_face(Face::Front, 100.0);
    assert!(!actions.iter().any(|a| matches!(a, Action::FlipStarted { .. })));
    let actions = core.tick(600.0);
    assert!(actions.contains(&Action::FlipFinished { face: Face::Front }));
    assert_eq!(core.display_face(), Face::Front);
}

#[test]
fn same_face_is_noop() {
    let mut core = EngineCore::default();
    assert!(core.set_face(Face::Front, 0.0).is_empty());
    assert!(!core.is_flipping());
}

#[test]
fn edits_after_flip_target_back_face() {
    let mut core = EngineCore::default();
    core.set_face(Face::Back, 0.0);
    core.tick(600.0);
    core.set_tool(Tool::Draw);
    core.on_pointer_down(at(0.0, 0.0));
    core.on_pointer_move(at(10.0, 10.0));
    core.on_pointer_up(at(10.0, 10.0));
    assert!(core.store.face(Face::Front).is_empty());
    assert_eq!(core.store.face(Face::Back).len(), 1);
}

// =============================================================
// Frame scheduling
// =============================================================

#[test]
fn repaint_requests_coalesce_until_taken() {
    let mut core = EngineCore::default();
    let first = core.set_tool(Tool::Draw);
    assert!(first.contains(&Action::RenderNeeded));
    let second = core.set_tool(Tool::Text);
    assert!(!second.contains(&Action::RenderNeeded));
    assert!(core.take_frame_request());
    assert!(!core.take_frame_request());
    assert!(core.set_tool(Tool::Select).contains(&Action::RenderNeeded));
}

#[test]
fn decorations_changed_reported_once_per_call() {
    let mut core = core_with(vec![sticker("a", 0.0, 0.0)]);
    click(&mut core, 0.0, 0.0);
    let actions = core.on_key_down(&Key::new("Delete"), no_modifiers());
    assert_eq!(actions.iter().filter(|a| **a == Action::DecorationsChanged).count(), 1);
}

// =============================================================
// Engine (with a recording surface)
// =============================================================

fn engine_with(decorations: Vec<Decoration>) -> Engine<RecordingSurface> {
    let mut core = EngineCore::default();
    core.load(front(decorations));
    Engine::new(RecordingSurface::new(), core)
}

fn take_ops(engine: &mut Engine<RecordingSurface>) -> Vec<Op> {
    std::mem::take(&mut engine.surface_mut().ops)
}

#[test]
fn frame_runs_only_when_requested() {
    let mut engine = Engine::new(RecordingSurface::new(), EngineCore::default());
    assert_eq!(engine.frame().unwrap(), None);
    assert!(engine.surface().ops.is_empty());

    let mut engine = engine_with(vec![sticker("a", 0.0, 0.0)]);
    assert_eq!(engine.frame().unwrap(), Some(RedrawKind::Full));
    assert_eq!(engine.frame().unwrap(), None);
}

#[test]
fn unchanged_render_is_a_skip() {
    let mut engine = engine_with(vec![sticker("a", 0.0, 0.0)]);
    engine.frame().unwrap();
    take_ops(&mut engine);
    assert_eq!(engine.render().unwrap(), RedrawKind::Skip);
    assert!(take_ops(&mut engine).is_empty());
}

#[test]
fn selection_frame_is_chrome_only() {
    let mut engine = engine_with(vec![sticker("a", 0.0, 0.0)]);
    engine.frame().unwrap();
    engine.core.on_pointer_down(at(0.0, 0.0));
    engine.core.on_pointer_up(at(0.0, 0.0));
    take_ops(&mut engine);
    assert_eq!(engine.frame().unwrap(), Some(RedrawKind::ChromeOnly));
    let ops = take_ops(&mut engine);
    assert_eq!(ops.iter().filter(|op| matches!(op, Op::StrokeRect(..))).count(), 1);
}

#[test]
fn undo_is_repainted_incrementally() {
    let mut engine = engine_with(vec![sticker("a", 0.0, 0.0), sticker("b", 150.0, 0.0)]);
    engine.frame().unwrap();
    engine.core.on_pointer_down(at(0.0, 0.0));
    engine.core.on_pointer_move(at(20.0, 0.0));
    engine.core.on_pointer_up(at(20.0, 0.0));
    engine.frame().unwrap();
    engine.core.undo();
    assert!(matches!(engine.frame().unwrap(), Some(RedrawKind::Incremental(_))));
}

#[test]
fn sticker_image_flow() {
    let url = "https://cdn.test/heart.png";
    let data = StickerData { url: url.into(), color: "#ff0000".into(), scale: 1.0 };
    let dec = Decoration::new(0.0, 0.0, DecorationData::Sticker(data));
    let mut engine = engine_with(vec![dec]);
    engine.frame().unwrap();
    assert_eq!(engine.take_image_requests(), vec![url.to_owned()]);
    assert!(engine.take_image_requests().is_empty());

    take_ops(&mut engine);
    let actions = engine.image_loaded(url, "heart-bitmap".to_owned());
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert!(matches!(engine.frame().unwrap(), Some(RedrawKind::Incremental(_))));
    assert_eq!(engine.surface().images(), vec!["heart-bitmap".to_owned()]);
}

#[test]
fn failed_image_falls_back_to_circle() {
    let url = "https://cdn.test/missing.png";
    let data = StickerData { url: url.into(), color: "#00ff00".into(), scale: 1.0 };
    let mut engine = engine_with(vec![Decoration::new(0.0, 0.0, DecorationData::Sticker(data))]);
    engine.frame().unwrap();
    engine.take_image_requests();
    take_ops(&mut engine);
    engine.image_failed(url, "404");
    engine.frame().unwrap();
    let ops = take_ops(&mut engine);
    assert!(ops.contains(&Op::FillStyle("#00ff00".into())));
    assert!(ops.iter().any(|op| matches!(op, Op::Arc { radius, .. } if *radius == 32.0)));
}

#[test]
fn text_is_hidden_while_edited() {
    let mut engine = Engine::new(RecordingSurface::new(), EngineCore::default());
    engine.core.set_tool(Tool::Text);
    engine.core.on_pointer_down(at(0.0, 0.0));
    engine.core.on_text_input("Hi");
    engine.frame().unwrap();
    assert!(engine.surface().texts().is_empty());

    take_ops(&mut engine);
    engine.core.commit_text_edit();
    engine.frame().unwrap();
    assert_eq!(engine.surface().texts(), vec!["Hi".to_owned()]);
}

#[test]
fn invalidate_forces_full_frame() {
    let mut engine = engine_with(vec![sticker("a", 0.0, 0.0)]);
    engine.frame().unwrap();
    assert_eq!(engine.invalidate(), vec![Action::RenderNeeded]);
    assert_eq!(engine.frame().unwrap(), Some(RedrawKind::Full));
}

#[test]
fn failed_frame_is_reported_and_recovers() {
    let mut engine = engine_with(vec![sticker("a", 0.0, 0.0)]);
    engine.surface_mut().fail_next = true;
    assert!(engine.frame().is_err());
    engine.core.set_tool(Tool::Draw);
    assert_eq!(engine.frame().unwrap(), Some(RedrawKind::Full));
}

#[test]
fn rasterize_face_paints_requested_face() {
    let mut core = EngineCore::default();
    core.load(FaceDecorations { front: vec![sticker("f", 0.0, 0.0)], back: vec![text_dec("b", 0.0, 0.0, "Back")] });
    let mut engine = Engine::new(RecordingSurface::new(), core);
    let mut target = RecordingSurface::new();
    engine.rasterize_face(Face::Back, &mut target, 960, 640).unwrap();
    assert_eq!(target.ops[0], Op::Resize(960, 640));
    assert_eq!(target.texts(), vec!["Back".to_owned()]);
    assert_eq!(target.arcs(), 0);
    assert!(engine.surface().ops.is_empty());
}
