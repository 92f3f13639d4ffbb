//! Interaction controller: turns pointer, keyboard and chrome events into
//! store mutations and repaint requests.
//!
//! `EngineCore` holds everything that does not need a drawing surface and is
//! tested directly. `Engine` wraps a core together with a [`Surface`], the
//! frame-to-frame [`Renderer`] and the image cache.
//!
//! Handlers return `Vec<Action>` for the host: repaint scheduling, cursor
//! changes, selection changes, and starting or ending the text-editing overlay.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::debug;

use crate::clipboard::{self, Clipboard};
use crate::config::{DrawSettings, EngineConfig, TextSettings};
use crate::coords::{CardSpace, Point, Resolution, SurfaceRect};
use crate::doc::{Decoration, DecorationData, DecorationId, DecorationStore, DrawingData, Face, FaceDecorations, TextData};
use crate::hit::{self, HitPart};
use crate::images::ImageCache;
use crate::input::{ArmedSticker, Button, InputState, Key, Modifiers, PendingNudge, PointerSample, Selection, Tap, Tool, UiState};
use crate::render::{self, RedrawKind, Renderer, Scene};
use crate::scheduler::FrameScheduler;
use crate::stickers;
use crate::stroke::{self, LiveStroke};
use crate::surface::{Surface, SurfaceError};
use crate::text::{EstimatedTextMeasure, TextMeasure};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A frame was scheduled; the host should call [`Engine::frame`] on its next refresh.
    RenderNeeded,
    /// CSS cursor name for the surface element.
    SetCursor(String),
    SelectionChanged(Option<Selection>),
    /// Show the text editing overlay.
    BeginTextEdit(TextEditRequest),
    /// Hide the text editing overlay.
    EndTextEdit { id: DecorationId },
    /// Decoration content changed (the host may autosave or refresh chrome).
    DecorationsChanged,
    FlipStarted { to: Face },
    FlipFinished { face: Face },
}

/// Where and how to show the text editing overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditRequest {
    pub face: Face,
    pub id: DecorationId,
    /// Overlay center in canvas pixel space (top-left origin, logical pixels).
    pub anchor: Point,
    /// Current payload: initial text and the style the overlay should mimic.
    pub data: TextData,
}

/// An in-flight front/back flip.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Flip {
    started_ms: f64,
}

/// Core engine state: all logic that doesn't depend on a drawing surface.
pub struct EngineCore {
    pub store: DecorationStore,
    pub clipboard: Clipboard,
    pub ui: UiState,
    pub input: InputState,
    pub config: EngineConfig,
    card: CardSpace,
    surface_rect: SurfaceRect,
    resolution: Resolution,
    /// Face that edits target; the requested face during a flip.
    active_face: Face,
    /// Face being painted; lags `active_face` until a flip completes.
    display_face: Face,
    flip: Option<Flip>,
    scheduler: FrameScheduler,
    measure: Box<dyn TextMeasure>,
    cursor: &'static str,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default(), Box::new(EstimatedTextMeasure::default()))
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig, measure: Box<dyn TextMeasure>) -> Self {
        let card = CardSpace::new(config.card_width, config.card_height);
        Self {
            store: DecorationStore::new(config.max_history, config.placeholder_text.clone()),
            clipboard: Clipboard::new(),
            ui: UiState::default(),
            input: InputState::Idle,
            card,
            surface_rect: SurfaceRect::new(0.0, 0.0, config.card_width, config.card_height),
            resolution: Resolution::new(config.card_width, config.card_height, 1.0),
            active_face: Face::Front,
            display_face: Face::Front,
            flip: None,
            scheduler: FrameScheduler::new(),
            measure,
            cursor: "default",
            config,
        }
    }

    // --- Data inputs ---

    /// Replace both faces (card load). Selection, gestures and history reset.
    pub fn load(&mut self, decorations: FaceDecorations) -> Vec<Action> {
        let mut actions = Vec::new();
        if let InputState::EditingText { id, .. } = std::mem::take(&mut self.input) {
            actions.push(Action::EndTextEdit { id });
        }
        self.ui.pending_nudge = None;
        self.ui.hover = None;
        if self.ui.selection.take().is_some() {
            actions.push(Action::SelectionChanged(None));
        }
        self.store.replace_all(decorations);
        self.notify_changed(&mut actions);
        actions
    }

    /// Decorations as they should be persisted: placeholder text left out.
    #[must_use]
    pub fn export(&self) -> FaceDecorations {
        self.store.decorations().without_placeholders(&self.config.placeholder_text)
    }

    // --- Viewport ---

    /// Update where the surface sits on screen and the device pixel ratio.
    pub fn set_viewport(&mut self, rect: SurfaceRect, dpr: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        self.surface_rect = rect;
        let resolution = Resolution::new(self.config.card_width, self.config.card_height, dpr);
        if resolution != self.resolution {
            self.resolution = resolution;
            self.request_render(&mut actions);
        }
        actions
    }

    // --- Faces ---

    /// Show the other side of the card.
    ///
    /// Starts a flip of `flip_duration_ms`; the displayed face switches on the
    /// first [`EngineCore::tick`] after it elapses. Requests during a flip only
    /// retarget it.
    pub fn set_face(&mut self, face: Face, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.flip.is_none() && face == self.display_face {
            return actions;
        }
        self.end_interaction(&mut actions);
        self.set_selection(None, &mut actions);
        self.active_face = face;
        if self.flip.is_none() {
            debug!(to = face.as_str(), "flip started");
            self.flip = Some(Flip { started_ms: now_ms });
            actions.push(Action::FlipStarted { to: face });
            self.request_render(&mut actions);
        }
        actions
    }

    /// Advance timers. Completes a flip whose duration has elapsed.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(flip) = self.flip else {
            return actions;
        };
        if now_ms - flip.started_ms < self.config.flip_duration_ms {
            return actions;
        }
        self.flip = None;
        self.display_face = self.active_face;
        debug!(face = self.display_face.as_str(), "flip finished");
        actions.push(Action::FlipFinished { face: self.display_face });
        self.request_render(&mut actions);
        actions
    }

    // --- Tool / style ---

    /// Set the active tool. An untouched placeholder text is discarded.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_interaction(&mut actions);
        self.discard_untouched_placeholder(&mut actions);
        if self.ui.tool != tool {
            self.ui.tool = tool;
            self.ui.hover = None;
            self.request_render(&mut actions);
        }
        self.update_cursor(&mut actions);
        actions
    }

    /// Arm a sticker for the sticker tool, or disarm with `None`.
    pub fn arm_sticker(&mut self, sticker: Option<ArmedSticker>) -> Vec<Action> {
        let mut actions = Vec::new();
        self.ui.armed_sticker = sticker;
        self.update_cursor(&mut actions);
        actions
    }

    /// Arm a built-in sticker by catalog id. Unknown ids disarm.
    pub fn arm_catalog_sticker(&mut self, id: &str) -> Vec<Action> {
        let armed = stickers::find(id).map(|def| ArmedSticker {
            catalog_id: Some(def.id.to_owned()),
            data: def.sticker_data(self.config.default_sticker_scale),
        });
        self.arm_sticker(armed)
    }

    /// Update pen settings; a selected drawing takes the new color and width.
    pub fn set_draw_settings(&mut self, settings: DrawSettings) -> Vec<Action> {
        let mut actions = Vec::new();
        self.ui.draw = settings;
        let Some((face, dec)) = self.selected_decoration() else {
            return actions;
        };
        if let DecorationData::Drawing(data) = &dec.data {
            let updated = DrawingData {
                color: self.ui.draw.color.clone(),
                line_width: self.ui.draw.line_width,
                ..data.clone()
            };
            if updated != *data {
                let id = dec.id.clone();
                self.store.update_decoration(face, &id, DecorationData::Drawing(updated));
                self.notify_changed(&mut actions);
            }
        }
        actions
    }

    /// Update font settings; a selected text decoration takes the new style.
    pub fn set_text_settings(&mut self, settings: TextSettings) -> Vec<Action> {
        let mut actions = Vec::new();
        self.ui.text = settings;
        let Some((face, dec)) = self.selected_decoration() else {
            return actions;
        };
        let Some(data) = dec.text() else {
            return actions;
        };
        let updated = TextData { text: data.text.clone(), ..text_data_from(&self.ui.text) };
        if updated == *data {
            return actions;
        }
        let id = dec.id.clone();
        if self.input.editing_id() == Some(&id) {
            self.store.update_decoration_without_history(face, &id, DecorationData::Text(updated));
            self.request_render(&mut actions);
        } else {
            self.store.update_decoration(face, &id, DecorationData::Text(updated));
            self.notify_changed(&mut actions);
        }
        actions
    }

    /// Set the selected decoration's scale override as one history step.
    pub fn scale_selected(&mut self, scale: f64) -> Vec<Action> {
        let mut actions = Vec::new();
        if !(scale.is_finite() && scale > 0.0) {
            return actions;
        }
        let Some(sel) = self.ui.selection.clone() else {
            return actions;
        };
        if self.store.update_decoration_scale(sel.face, &sel.id, scale) {
            self.store.save_decoration_position_to_history(sel.face, &sel.id);
            self.notify_changed(&mut actions);
        }
        actions
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, sample: PointerSample) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.flip.is_some() {
            return actions;
        }
        if sample.touches > 1 {
            self.cancel_gesture(&mut actions);
            return actions;
        }
        if sample.button != Button::Primary {
            return actions;
        }
        let Some(pt) = self.card_point(&sample) else {
            return actions;
        };
        self.end_interaction(&mut actions);

        let face = self.active_face;
        match self.ui.tool {
            Tool::Draw => {
                let stroke = LiveStroke::new(pt, self.ui.draw.color.clone(), self.ui.draw.line_width);
                self.input = InputState::Drawing { face, stroke };
                self.request_render(&mut actions);
            }
            Tool::Select => self.select_down(face, pt, &mut actions),
            Tool::Text => self.text_down(face, pt, sample.time_ms, &mut actions),
            Tool::Sticker => self.sticker_down(face, pt, &mut actions),
        }
        self.update_cursor(&mut actions);
        actions
    }

    pub fn on_pointer_move(&mut self, sample: PointerSample) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.flip.is_some() {
            return actions;
        }
        if sample.touches > 1 {
            self.cancel_gesture(&mut actions);
            return actions;
        }
        let Some(pt) = self.card_point(&sample) else {
            return actions;
        };

        match &mut self.input {
            InputState::Dragging { face, original, origin, moved } => {
                *moved = true;
                let face = *face;
                let id = original.id.clone();
                let x = original.x + (pt.x - origin.x);
                let y = original.y + (pt.y - origin.y);
                if self.store.update_decoration_position(face, &id, x, y) {
                    self.request_render(&mut actions);
                }
            }
            InputState::Drawing { stroke, .. } => {
                if stroke.push(pt) {
                    self.request_render(&mut actions);
                }
            }
            InputState::Idle => {
                if self.ui.tool == Tool::Select {
                    self.ui.hover = hit::find_decoration_at_point(
                        self.store.face(self.active_face),
                        pt,
                        &self.config,
                        self.measure.as_ref(),
                    )
                    .map(|d| d.id.clone());
                }
            }
            InputState::EditingText { .. } => {}
        }
        self.update_cursor(&mut actions);
        actions
    }

    pub fn on_pointer_up(&mut self, _sample: PointerSample) -> Vec<Action> {
        let mut actions = Vec::new();
        self.finish_gesture(&mut actions);
        self.update_cursor(&mut actions);
        actions
    }

    /// Pointer left the surface: finish any gesture as if released.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.finish_gesture(&mut actions);
        self.ui.hover = None;
        self.update_cursor(&mut actions);
        actions
    }

    /// Double-click on a text decoration starts editing it.
    pub fn on_double_click(&mut self, sample: PointerSample) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.flip.is_some() {
            return actions;
        }
        let Some(pt) = self.card_point(&sample) else {
            return actions;
        };
        let face = self.active_face;
        let hit = hit::find_decoration_at_point(self.store.face(face), pt, &self.config, self.measure.as_ref())
            .filter(|d| d.text().is_some())
            .map(|d| d.id.clone());
        let Some(id) = hit else {
            return actions;
        };
        if self.input.editing_id() == Some(&id) {
            return actions;
        }
        self.end_interaction(&mut actions);
        self.set_selection(Some(Selection { face, id: id.clone() }), &mut actions);
        self.begin_text_edit(face, &id, &mut actions);
        actions
    }

    // --- Text editing ---

    /// Live keystroke from the overlay. Updates the canvas without history.
    pub fn on_text_input(&mut self, value: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        let InputState::EditingText { face, id, value: live, .. } = &mut self.input else {
            return actions;
        };
        value.clone_into(live);
        let (face, id) = (*face, id.clone());
        let Some(mut data) = self.store.get(face, &id).and_then(Decoration::text).cloned() else {
            return actions;
        };
        value.clone_into(&mut data.text);
        if self.store.update_decoration_without_history(face, &id, DecorationData::Text(data)) {
            self.request_render(&mut actions);
        }
        actions
    }

    /// Overlay lost focus or Enter was pressed: record the edit as one history step.
    pub fn commit_text_edit(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.commit_text_edit_into(&mut actions);
        self.update_cursor(&mut actions);
        actions
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.input.editing_id().is_some() {
            if key.is("Enter") && !modifiers.shift {
                self.commit_text_edit_into(&mut actions);
            } else if key.is("Escape") {
                self.commit_text_edit_into(&mut actions);
                self.set_selection(None, &mut actions);
            }
            return actions;
        }

        if modifiers.command() {
            if (key.is_letter('z') && modifiers.shift) || key.is_letter('y') {
                actions.extend(self.redo());
            } else if key.is_letter('z') {
                actions.extend(self.undo());
            } else if key.is_letter('c') {
                self.copy();
            } else if key.is_letter('v') {
                actions.extend(self.paste());
            } else if key.is_letter('d') {
                actions.extend(self.duplicate());
            }
            return actions;
        }

        if key.is("Escape") {
            self.cancel_gesture(&mut actions);
            self.set_selection(None, &mut actions);
        } else if key.is("Delete") || key.is("Backspace") {
            actions.extend(self.delete_selected());
        } else if let Some((dx, dy)) = key.arrow_direction() {
            let step = if modifiers.shift { self.config.nudge_step_large } else { self.config.nudge_step };
            self.nudge(dx * step, dy * step, &mut actions);
        }
        self.update_cursor(&mut actions);
        actions
    }

    /// Arrow release commits the coalesced nudge as one history step.
    pub fn on_key_up(&mut self, key: &Key, _modifiers: Modifiers) -> Vec<Action> {
        let mut actions = Vec::new();
        if key.arrow_direction().is_some() {
            self.flush_nudge(&mut actions);
        }
        actions
    }

    // --- Edit commands ---

    pub fn undo(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_interaction(&mut actions);
        if self.store.undo() {
            self.set_selection(None, &mut actions);
            self.notify_changed(&mut actions);
        }
        actions
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_interaction(&mut actions);
        if self.store.redo() {
            self.set_selection(None, &mut actions);
            self.notify_changed(&mut actions);
        }
        actions
    }

    /// Copy the selected decoration to the clipboard. Returns false with no selection.
    pub fn copy(&mut self) -> bool {
        let Some((_, dec)) = self.selected_decoration() else {
            return false;
        };
        let dec = dec.clone();
        self.clipboard.copy(&dec);
        true
    }

    /// Insert an offset copy of the clipboard on the active face and select it.
    ///
    /// The clipboard then holds the pasted copy, so repeated pastes cascade.
    pub fn paste(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_interaction(&mut actions);
        let Some(copy) = self.clipboard.paste_copy(self.config.paste_offset) else {
            return actions;
        };
        self.clipboard.copy(&copy);
        self.insert_and_select(self.active_face, copy, &mut actions);
        actions
    }

    /// Insert an offset copy of the selection and select it.
    pub fn duplicate(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_interaction(&mut actions);
        let Some((face, dec)) = self.selected_decoration() else {
            return actions;
        };
        let copy = clipboard::offset_copy(dec, self.config.paste_offset);
        self.insert_and_select(face, copy, &mut actions);
        actions
    }

    /// Remove the selected decoration.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.end_interaction(&mut actions);
        let Some(sel) = self.ui.selection.clone() else {
            return actions;
        };
        self.ui.selection = None;
        actions.push(Action::SelectionChanged(None));
        if self.store.remove_decoration(sel.face, &sel.id).is_some() {
            self.notify_changed(&mut actions);
        } else {
            self.request_render(&mut actions);
        }
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn decorations(&self) -> &FaceDecorations {
        self.store.decorations()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.ui.selection.as_ref()
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    /// Face that edits target.
    #[must_use]
    pub fn active_face(&self) -> Face {
        self.active_face
    }

    /// Face currently painted.
    #[must_use]
    pub fn display_face(&self) -> Face {
        self.display_face
    }

    #[must_use]
    pub fn is_flipping(&self) -> bool {
        self.flip.is_some()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Current cursor name.
    #[must_use]
    pub fn cursor(&self) -> &'static str {
        self.cursor
    }

    #[must_use]
    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    #[must_use]
    pub fn card_space(&self) -> CardSpace {
        self.card
    }

    /// Consume the pending frame request. True if a frame was scheduled.
    pub fn take_frame_request(&mut self) -> bool {
        self.scheduler.take()
    }

    /// Read-only view of what the next frame should show.
    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        let face = self.display_face;
        Scene {
            face,
            decorations: self.store.face(face),
            generation: self.store.generation(),
            selection: self.ui.selected_on(face),
            tool: self.ui.tool,
            editing: self.input.editing_id(),
            flipping: self.flip.is_some(),
            live_stroke: self.input.live_stroke(),
            resolution: self.resolution,
        }
    }

    // --- Internals: pointer tools ---

    fn card_point(&self, sample: &PointerSample) -> Option<Point> {
        self.card.to_card_space(sample.screen, self.surface_rect, sample.touches)
    }

    /// Hit test honoring the delete affordance only where chrome is visible.
    fn hit_at(&self, face: Face, pt: Point) -> Option<(DecorationId, HitPart, bool)> {
        let selected = self
            .ui
            .selected_on(face)
            .and_then(|id| self.store.get(face, id))
            .filter(|d| render::chrome_visible(self.ui.tool, d.kind()));
        hit::hit_test(self.store.face(face), pt, selected, &self.config, self.measure.as_ref())
            .map(|h| (h.decoration.id.clone(), h.part, h.decoration.text().is_some()))
    }

    fn select_down(&mut self, face: Face, pt: Point, actions: &mut Vec<Action>) {
        match self.hit_at(face, pt) {
            Some((id, HitPart::DeleteAffordance, _)) => self.remove(face, &id, actions),
            Some((id, HitPart::Body, _)) => {
                self.set_selection(Some(Selection { face, id: id.clone() }), actions);
                if let Some(original) = self.store.get(face, &id).cloned() {
                    self.input = InputState::Dragging { face, original, origin: pt, moved: false };
                }
            }
            None => self.set_selection(None, actions),
        }
    }

    fn text_down(&mut self, face: Face, pt: Point, time_ms: f64, actions: &mut Vec<Action>) {
        let double = self.register_tap(pt, time_ms);
        match self.hit_at(face, pt) {
            Some((id, HitPart::DeleteAffordance, _)) => self.remove(face, &id, actions),
            Some((id, HitPart::Body, true)) => {
                let already = self.ui.selected_on(face) == Some(&id);
                self.set_selection(Some(Selection { face, id: id.clone() }), actions);
                if already || double {
                    self.begin_text_edit(face, &id, actions);
                }
            }
            Some((_, HitPart::Body, false)) => {}
            None => {
                self.set_selection(None, actions);
                let data = TextData { text: self.config.placeholder_text.clone(), ..text_data_from(&self.ui.text) };
                let dec = Decoration::new(pt.x, pt.y, DecorationData::Text(data));
                let id = dec.id.clone();
                if self.store.add_decoration(face, dec) {
                    self.set_selection(Some(Selection { face, id: id.clone() }), actions);
                    self.begin_text_edit(face, &id, actions);
                    self.notify_changed(actions);
                }
            }
        }
    }

    fn sticker_down(&mut self, face: Face, pt: Point, actions: &mut Vec<Action>) {
        let Some(armed) = &self.ui.armed_sticker else {
            self.set_selection(None, actions);
            return;
        };
        let occupied =
            hit::find_decoration_at_point(self.store.face(face), pt, &self.config, self.measure.as_ref()).is_some();
        if occupied {
            return;
        }
        let mut dec = Decoration::new(pt.x, pt.y, DecorationData::Sticker(armed.data.clone()));
        dec.scale = Some(self.config.default_sticker_scale);
        dec.rotation = Some(0.0);
        if self.store.add_decoration(face, dec) {
            self.notify_changed(actions);
        }
    }

    /// Record a tap; true if it completes a double tap.
    fn register_tap(&mut self, pt: Point, time_ms: f64) -> bool {
        let prev = self.ui.last_tap.replace(Tap { at: pt, time_ms });
        let double = prev.is_some_and(|tap| {
            time_ms - tap.time_ms <= self.config.double_tap_ms && tap.at.distance(pt) <= self.config.double_tap_distance
        });
        if double {
            self.ui.last_tap = None;
        }
        double
    }

    // --- Internals: gestures ---

    /// Pointer release: commit a drag as one history step or a stroke as a drawing.
    fn finish_gesture(&mut self, actions: &mut Vec<Action>) {
        match std::mem::take(&mut self.input) {
            InputState::Dragging { face, original, moved, .. } => {
                if moved && self.store.save_decoration_position_to_history(face, &original.id) {
                    self.notify_changed(actions);
                }
            }
            InputState::Drawing { face, stroke } => self.commit_stroke(face, stroke, actions),
            other => self.input = other,
        }
    }

    /// Second touch or Escape: restore a dragged decoration, drop a live stroke.
    fn cancel_gesture(&mut self, actions: &mut Vec<Action>) {
        match std::mem::take(&mut self.input) {
            InputState::Dragging { face, original, .. } => {
                self.store.restore_decoration(face, &original);
                self.request_render(actions);
            }
            InputState::Drawing { .. } => self.request_render(actions),
            other => self.input = other,
        }
    }

    /// Settle whatever is in progress before a new command runs.
    fn end_interaction(&mut self, actions: &mut Vec<Action>) {
        self.flush_nudge(actions);
        self.commit_text_edit_into(actions);
        self.finish_gesture(actions);
    }

    fn commit_stroke(&mut self, face: Face, stroke: LiveStroke, actions: &mut Vec<Action>) {
        if !stroke.is_committable() {
            self.request_render(actions);
            return;
        }
        let points = stroke::smooth(&stroke.points, self.ui.draw.smoothing);
        let data = DrawingData {
            paths: vec![stroke::to_stroke(&points)],
            color: stroke.color,
            line_width: stroke.line_width,
        };
        if self.store.add_decoration(face, Decoration::new(0.0, 0.0, DecorationData::Drawing(data))) {
            self.notify_changed(actions);
        }
    }

    fn nudge(&mut self, dx: f64, dy: f64, actions: &mut Vec<Action>) {
        if !self.input.is_idle() {
            return;
        }
        let Some(sel) = self.ui.selection.clone() else {
            return;
        };
        let Some(dec) = self.store.get(sel.face, &sel.id) else {
            return;
        };
        let (x, y) = (dec.x + dx, dec.y + dy);
        if self.store.update_decoration_position(sel.face, &sel.id, x, y) {
            self.ui.pending_nudge = Some(PendingNudge { face: sel.face, id: sel.id });
            self.request_render(actions);
        }
    }

    fn flush_nudge(&mut self, actions: &mut Vec<Action>) {
        let Some(nudge) = self.ui.pending_nudge.take() else {
            return;
        };
        if self.store.save_decoration_position_to_history(nudge.face, &nudge.id) {
            self.notify_changed(actions);
        }
    }

    // --- Internals: text ---

    fn begin_text_edit(&mut self, face: Face, id: &DecorationId, actions: &mut Vec<Action>) {
        let Some(dec) = self.store.get(face, id) else {
            return;
        };
        let Some(data) = dec.text() else {
            return;
        };
        let request = TextEditRequest {
            face,
            id: id.clone(),
            anchor: self.card.card_to_pixel(Point::new(dec.x, dec.y)),
            data: data.clone(),
        };
        self.input = InputState::EditingText { face, id: id.clone(), value: data.text.clone() };
        actions.push(Action::BeginTextEdit(request));
        self.request_render(actions);
    }

    /// Empty or placeholder-only text removes the decoration; anything else is
    /// recorded through the historied update.
    fn commit_text_edit_into(&mut self, actions: &mut Vec<Action>) {
        let (face, id, value) = match std::mem::take(&mut self.input) {
            InputState::EditingText { face, id, value } => (face, id, value),
            other => {
                self.input = other;
                return;
            }
        };
        actions.push(Action::EndTextEdit { id: id.clone() });

        if value.trim().is_empty() || value == self.config.placeholder_text {
            debug!(id = %id, "empty text discarded");
            if self.ui.selected_on(face) == Some(&id) {
                self.ui.selection = None;
                actions.push(Action::SelectionChanged(None));
            }
            self.remove(face, &id, actions);
            return;
        }
        let Some(mut data) = self.store.get(face, &id).and_then(Decoration::text).cloned() else {
            return;
        };
        data.text = value;
        self.store.update_decoration(face, &id, DecorationData::Text(data));
        self.notify_changed(actions);
    }

    /// Remove the selected text decoration if it still holds only the placeholder.
    fn discard_untouched_placeholder(&mut self, actions: &mut Vec<Action>) {
        let Some(sel) = self.ui.selection.clone() else {
            return;
        };
        let untouched = self
            .store
            .get(sel.face, &sel.id)
            .is_some_and(|d| d.is_placeholder(&self.config.placeholder_text));
        if !untouched {
            return;
        }
        debug!(id = %sel.id, "placeholder text discarded");
        self.ui.selection = None;
        actions.push(Action::SelectionChanged(None));
        self.remove(sel.face, &sel.id, actions);
    }

    // --- Internals: store + selection ---

    fn remove(&mut self, face: Face, id: &DecorationId, actions: &mut Vec<Action>) {
        if self.ui.selected_on(face) == Some(id) {
            self.ui.selection = None;
            actions.push(Action::SelectionChanged(None));
        }
        if self.store.remove_decoration(face, id).is_some() {
            self.notify_changed(actions);
        }
    }

    fn insert_and_select(&mut self, face: Face, dec: Decoration, actions: &mut Vec<Action>) {
        let id = dec.id.clone();
        if self.store.add_decoration(face, dec) {
            self.set_selection(Some(Selection { face, id }), actions);
            self.notify_changed(actions);
        }
    }

    fn selected_decoration(&self) -> Option<(Face, &Decoration)> {
        let sel = self.ui.selection.as_ref()?;
        self.store.get(sel.face, &sel.id).map(|d| (sel.face, d))
    }

    fn set_selection(&mut self, selection: Option<Selection>, actions: &mut Vec<Action>) {
        if self.ui.selection == selection {
            return;
        }
        self.discard_untouched_placeholder(actions);
        self.ui.selection.clone_from(&selection);
        actions.push(Action::SelectionChanged(selection));
        self.request_render(actions);
    }

    // --- Internals: host notifications ---

    fn request_render(&mut self, actions: &mut Vec<Action>) {
        if self.scheduler.request() {
            actions.push(Action::RenderNeeded);
        }
    }

    fn notify_changed(&mut self, actions: &mut Vec<Action>) {
        if !actions.contains(&Action::DecorationsChanged) {
            actions.push(Action::DecorationsChanged);
        }
        self.request_render(actions);
    }

    fn update_cursor(&mut self, actions: &mut Vec<Action>) {
        let cursor = match (&self.input, self.ui.tool) {
            (InputState::Dragging { .. }, _) => "grabbing",
            (_, Tool::Select) if self.ui.hover.is_some() => "grab",
            (_, Tool::Select) => "default",
            (_, Tool::Sticker) if self.ui.armed_sticker.is_some() => "crosshair",
            (_, Tool::Sticker) => "default",
            (_, Tool::Text) => "text",
            (_, Tool::Draw) => "crosshair",
        };
        if cursor != self.cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor.to_owned()));
        }
    }
}

/// Text payload with the given style and empty text.
fn text_data_from(settings: &TextSettings) -> TextData {
    TextData {
        text: String::new(),
        font_size: settings.font_size,
        font_family: settings.font_family.clone(),
        font_weight: settings.font_weight,
        font_style: settings.font_style,
        color: settings.color.clone(),
        text_decoration: settings.text_decoration,
    }
}

// =============================================================
// Engine
// =============================================================

/// The full engine: an [`EngineCore`] bound to a drawing surface.
pub struct Engine<S: Surface> {
    pub core: EngineCore,
    surface: S,
    renderer: Renderer,
    images: ImageCache<S::Image>,
}

impl<S: Surface> Engine<S> {
    #[must_use]
    pub fn new(surface: S, core: EngineCore) -> Self {
        Self { core, surface, renderer: Renderer::new(), images: ImageCache::new() }
    }

    /// Paint the scheduled frame, if any. Call from the host's refresh callback.
    ///
    /// # Errors
    ///
    /// Propagates surface failures; the following frame is then a full redraw.
    pub fn frame(&mut self) -> Result<Option<RedrawKind>, SurfaceError> {
        if !self.core.take_frame_request() {
            return Ok(None);
        }
        self.render().map(Some)
    }

    /// Classify and paint now, regardless of scheduling.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn render(&mut self) -> Result<RedrawKind, SurfaceError> {
        let scene = self.core.scene();
        self.renderer.render(&mut self.surface, &scene, &mut self.images, &self.core.config, self.core.measure())
    }

    /// Force the next frame to repaint everything (e.g. the host lost the canvas contents).
    pub fn invalidate(&mut self) -> Vec<Action> {
        self.renderer.invalidate();
        let mut actions = Vec::new();
        self.core.request_render(&mut actions);
        actions
    }

    /// Image URLs the host should start loading.
    pub fn take_image_requests(&mut self) -> Vec<String> {
        self.images.take_requests()
    }

    /// A sticker image finished loading.
    pub fn image_loaded(&mut self, url: &str, image: S::Image) -> Vec<Action> {
        self.images.resolve(url, image);
        let mut actions = Vec::new();
        self.core.request_render(&mut actions);
        actions
    }

    /// A sticker image failed; its stickers fall back to a color circle.
    pub fn image_failed(&mut self, url: &str, reason: &str) -> Vec<Action> {
        self.images.fail(url, reason);
        let mut actions = Vec::new();
        self.core.request_render(&mut actions);
        actions
    }

    /// Rasterize one face onto `target` for the 3D viewer, without chrome.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn rasterize_face<T>(&mut self, face: Face, target: &mut T, width: u32, height: u32) -> Result<(), SurfaceError>
    where
        T: Surface<Image = S::Image>,
    {
        render::rasterize_face(
            target,
            self.core.store.face(face),
            &mut self.images,
            &self.core.config,
            self.core.measure(),
            width,
            height,
        )
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
