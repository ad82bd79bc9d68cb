use std::collections::BTreeMap;

use eframe::egui;
use glam::Vec2;

use arstage_core::{FrameInput, TouchPhase, TouchPoint};

// Synthesized finger ids, far above anything a touch screen reports.
const MOUSE_FINGER: u64 = 1 << 48;
const MIRROR_FINGER: u64 = MOUSE_FINGER + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RawTouch {
    pub id: u64,
    pub position: Vec2,
    pub phase: RawPhase,
}

/// Turns the frame's raw touch events into per-finger samples: fingers that
/// stay down without events become `Stationary`, and a start+end arriving in
/// the same frame is stretched over two frames so taps are never lost.
#[derive(Default)]
pub(crate) struct TouchTracker {
    active: BTreeMap<u64, Vec2>,
    pending_end: Vec<u64>,
    saw_real_touch: bool,
    mouse_down: bool,
    mirror_down: bool,
}

impl TouchTracker {
    pub fn frame(&mut self, raw: &[RawTouch], dt: f32) -> FrameInput {
        let mut phases: BTreeMap<u64, (Vec2, TouchPhase)> = self
            .active
            .iter()
            .map(|(id, position)| (*id, (*position, TouchPhase::Stationary)))
            .collect();

        for id in std::mem::take(&mut self.pending_end) {
            if let Some(entry) = phases.get_mut(&id) {
                entry.1 = TouchPhase::Ended;
            }
        }

        for event in raw {
            match event.phase {
                RawPhase::Start => {
                    phases.insert(event.id, (event.position, TouchPhase::Began));
                }
                RawPhase::Move => {
                    if let Some((position, phase)) = phases.get_mut(&event.id) {
                        *position = event.position;
                        if *phase == TouchPhase::Stationary {
                            *phase = TouchPhase::Moved;
                        }
                    }
                }
                RawPhase::End => {
                    if let Some((position, phase)) = phases.get_mut(&event.id) {
                        *position = event.position;
                        if *phase == TouchPhase::Began {
                            // Keep the tap visible this frame, end it next.
                            self.pending_end.push(event.id);
                        } else {
                            *phase = TouchPhase::Ended;
                        }
                    }
                }
            }
        }

        self.active = phases
            .iter()
            .filter(|(_, (_, phase))| *phase != TouchPhase::Ended)
            .map(|(id, (position, _))| (*id, *position))
            .collect();

        let touches = phases
            .into_iter()
            .map(|(id, (position, phase))| TouchPoint {
                id,
                position,
                phase,
            })
            .collect();
        FrameInput::new(touches, dt)
    }

    /// Gathers this frame's input over the viewport: real touch events when
    /// present, otherwise a finger synthesized from the mouse. Holding
    /// ctrl/cmd adds a second finger mirrored about the viewport center so
    /// pinch gestures can be exercised on a desktop.
    pub fn collect(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        rect: egui::Rect,
    ) -> FrameInput {
        let dt = ctx.input(|i| i.stable_dt.max(0.0));
        let mut raw = Vec::new();

        let events = ctx.input(|i| i.events.clone());
        for event in events {
            if let egui::Event::Touch { id, phase, pos, .. } = event {
                if phase == egui::TouchPhase::Start && !rect.contains(pos) {
                    continue;
                }
                self.saw_real_touch = true;
                let position = Vec2::new(pos.x, pos.y);
                let phase = match phase {
                    egui::TouchPhase::Start => RawPhase::Start,
                    egui::TouchPhase::Move => RawPhase::Move,
                    egui::TouchPhase::End | egui::TouchPhase::Cancel => RawPhase::End,
                };
                raw.push(RawTouch {
                    id: id.0,
                    position,
                    phase,
                });
            }
        }

        if !self.saw_real_touch {
            self.emulate_mouse(ctx, response, rect, &mut raw);
        }

        self.frame(&raw, dt)
    }

    fn emulate_mouse(
        &mut self,
        ctx: &egui::Context,
        response: &egui::Response,
        rect: egui::Rect,
        raw: &mut Vec<RawTouch>,
    ) {
        let modifiers = ctx.input(|i| i.modifiers);
        // Alt-drags belong to the camera.
        if modifiers.alt {
            self.release_mouse(raw);
            return;
        }

        let pointer_pos = ctx.input(|i| i.pointer.interact_pos());
        let pressed = response.is_pointer_button_down_on()
            && ctx.input(|i| i.pointer.primary_down());

        if !pressed {
            self.release_mouse(raw);
            return;
        }
        let Some(pos) = pointer_pos else {
            self.release_mouse(raw);
            return;
        };

        let position = Vec2::new(pos.x, pos.y);
        let phase = if self.mouse_down {
            RawPhase::Move
        } else {
            RawPhase::Start
        };
        self.mouse_down = true;
        raw.push(RawTouch {
            id: MOUSE_FINGER,
            position,
            phase,
        });

        if modifiers.ctrl || modifiers.command {
            let center = rect.center();
            let mirrored = Vec2::new(2.0 * center.x - position.x, 2.0 * center.y - position.y);
            let phase = if self.mirror_down {
                RawPhase::Move
            } else {
                RawPhase::Start
            };
            self.mirror_down = true;
            raw.push(RawTouch {
                id: MIRROR_FINGER,
                position: mirrored,
                phase,
            });
        } else if self.mirror_down {
            self.mirror_down = false;
            let last = self.active.get(&MIRROR_FINGER).copied().unwrap_or(position);
            raw.push(RawTouch {
                id: MIRROR_FINGER,
                position: last,
                phase: RawPhase::End,
            });
        }
    }

    fn release_mouse(&mut self, raw: &mut Vec<RawTouch>) {
        for (down, id) in [
            (&mut self.mouse_down, MOUSE_FINGER),
            (&mut self.mirror_down, MIRROR_FINGER),
        ] {
            if *down {
                *down = false;
                let last = self.active.get(&id).copied().unwrap_or(Vec2::ZERO);
                raw.push(RawTouch {
                    id,
                    position: last,
                    phase: RawPhase::End,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: u64, x: f32, phase: RawPhase) -> RawTouch {
        RawTouch {
            id,
            position: Vec2::new(x, 0.0),
            phase,
        }
    }

    fn phase_of(frame: &FrameInput, id: u64) -> Option<TouchPhase> {
        frame
            .touches
            .iter()
            .find(|touch| touch.id == id)
            .map(|touch| touch.phase)
    }

    #[test]
    fn began_then_moved_then_stationary() {
        let mut tracker = TouchTracker::default();
        let frame = tracker.frame(&[raw(7, 10.0, RawPhase::Start)], 0.016);
        assert_eq!(phase_of(&frame, 7), Some(TouchPhase::Began));

        let frame = tracker.frame(&[raw(7, 14.0, RawPhase::Move)], 0.016);
        assert_eq!(phase_of(&frame, 7), Some(TouchPhase::Moved));

        let frame = tracker.frame(&[], 0.016);
        assert_eq!(phase_of(&frame, 7), Some(TouchPhase::Stationary));

        let frame = tracker.frame(&[raw(7, 14.0, RawPhase::End)], 0.016);
        assert_eq!(phase_of(&frame, 7), Some(TouchPhase::Ended));

        let frame = tracker.frame(&[], 0.016);
        assert!(frame.touches.is_empty());
    }

    #[test]
    fn same_frame_tap_spans_two_frames() {
        let mut tracker = TouchTracker::default();
        let frame = tracker.frame(
            &[raw(3, 5.0, RawPhase::Start), raw(3, 5.0, RawPhase::End)],
            0.016,
        );
        assert_eq!(phase_of(&frame, 3), Some(TouchPhase::Began));

        let frame = tracker.frame(&[], 0.016);
        assert_eq!(phase_of(&frame, 3), Some(TouchPhase::Ended));

        let frame = tracker.frame(&[], 0.016);
        assert!(frame.touches.is_empty());
    }

    #[test]
    fn move_in_begin_frame_stays_began() {
        let mut tracker = TouchTracker::default();
        let frame = tracker.frame(
            &[raw(1, 0.0, RawPhase::Start), raw(1, 4.0, RawPhase::Move)],
            0.016,
        );
        let touch = frame.touches.iter().find(|t| t.id == 1).unwrap();
        assert_eq!(touch.phase, TouchPhase::Began);
        assert!((touch.position.x - 4.0).abs() < 1.0e-6);
    }

    #[test]
    fn unknown_fingers_are_ignored() {
        let mut tracker = TouchTracker::default();
        let frame = tracker.frame(&[raw(9, 1.0, RawPhase::Move)], 0.016);
        assert!(frame.touches.is_empty());
        let frame = tracker.frame(&[raw(9, 1.0, RawPhase::End)], 0.016);
        assert!(frame.touches.is_empty());
    }
}
