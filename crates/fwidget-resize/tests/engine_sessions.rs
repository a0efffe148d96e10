//! Direct-drive resize sessions: edge rules, snapping, veto, exclusivity,
//! reset and the status readout.

use std::cell::RefCell;
use std::rc::Rc;

use fwidget_dom::{Display, Document, Modifiers, NodeId, PagePoint, Position, Tag};
use fwidget_resize::{
    BeforeResizeVerdict, Geometry, HandleSpec, ResizeConfig, ResizeEdge, ResizeEffect,
    ResizeEngine, ResizeEvent, ResizeNoopReason, ResizeState,
};
use pretty_assertions::assert_eq;

fn boxed(width: i32, height: i32) -> (Document, NodeId) {
    let mut doc = Document::new();
    let el = doc.create_element(Tag::Div);
    doc.set_id_attr(el, "panel").expect("id");
    if let Some(style) = doc.style_mut(el) {
        style.width = Some(width);
        style.height = Some(height);
    }
    doc.append_child(doc.body(), el).expect("append");
    doc.set_offset(el, PagePoint::new(10, 20)).expect("offset");
    (doc, el)
}

fn size(doc: &Document, node: NodeId) -> (i32, i32) {
    (doc.client_width(node), doc.client_height(node))
}

fn drag(
    engine: &mut ResizeEngine,
    doc: &mut Document,
    edge: ResizeEdge,
    from: PagePoint,
    to: PagePoint,
) {
    let handle = engine.handle_node(edge).expect("handle");
    engine.handle_mouse_down(doc, handle, from, Modifiers::NONE);
    engine.handle_pointer_move(doc, to, Modifiers::NONE);
    engine.handle_mouse_up(doc, to);
}

#[test]
fn right_edge_session_end_to_end() {
    let (mut doc, el) = boxed(100, 100);
    let mut engine = ResizeEngine::new(&mut doc, el, ResizeConfig::default()).expect("engine");
    let handle = engine.handle_node(ResizeEdge::Right).expect("handle");

    let down = engine.handle_mouse_down(&doc, handle, PagePoint::new(110, 50), Modifiers::NONE);
    assert_eq!(down.effect, ResizeEffect::Primed { edge: ResizeEdge::Right });
    assert_eq!(engine.state(), ResizeState::Primed { edge: ResizeEdge::Right });

    let moved = engine.handle_pointer_move(&mut doc, PagePoint::new(140, 50), Modifiers::NONE);
    let expected = Geometry::new(100, 130, Some(20), Some(10));
    assert_eq!(moved.effect, ResizeEffect::Applied { geometry: expected });
    assert_eq!(
        moved.events,
        vec![
            ResizeEvent::StartResize {
                edge: ResizeEdge::Right,
                geometry: Geometry::new(100, 100, Some(20), Some(10)),
            },
            ResizeEvent::Resize { geometry: expected },
        ]
    );
    assert!(engine.is_active());
    assert_eq!(engine.active_handle_node(), Some(handle));
    assert_eq!(size(&doc, el), (130, 100));

    let up = engine.handle_mouse_up(&mut doc, PagePoint::new(140, 50));
    assert_eq!(up.to, ResizeState::Idle);
    assert!(matches!(up.effect, ResizeEffect::Ended { edge: ResizeEdge::Right, .. }));
    assert!(matches!(up.events.last(), Some(ResizeEvent::EndResize { .. })));
    assert_eq!(engine.committed_size().width, 130);
    assert!(up.transition_id > moved.transition_id);
}

#[test]
fn every_edge_moves_only_its_dimensions() {
    // (edge, pointer delta, expected (width, height))
    let cases = [
        (ResizeEdge::Right, (20, 7), (120, 100)),
        (ResizeEdge::Left, (20, 7), (80, 100)),
        (ResizeEdge::Bottom, (7, 20), (100, 120)),
        (ResizeEdge::Top, (7, 20), (100, 80)),
        (ResizeEdge::BottomRight, (20, 30), (120, 130)),
        (ResizeEdge::BottomLeft, (20, 30), (80, 130)),
        (ResizeEdge::TopRight, (20, 30), (120, 70)),
        (ResizeEdge::TopLeft, (20, 30), (80, 70)),
    ];
    for (edge, (dx, dy), expected) in cases {
        let (mut doc, el) = boxed(100, 100);
        let config = ResizeConfig {
            handles: HandleSpec::all(),
            ..ResizeConfig::default()
        };
        let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
        let start = PagePoint::new(60, 70);
        drag(&mut engine, &mut doc, edge, start, start.offset(dx, dy));
        assert_eq!(size(&doc, el), expected, "edge {edge}");
    }
}

#[test]
fn top_left_on_positioned_element_keeps_opposite_corner() {
    let mut doc = Document::new();
    let el = doc.create_element(Tag::Div);
    if let Some(style) = doc.style_mut(el) {
        style.position = Position::Absolute;
        style.width = Some(200);
        style.height = Some(100);
    }
    doc.append_child(doc.body(), el).expect("append");
    doc.set_xy(el, PagePoint::new(100, 100)).expect("xy");
    let config = ResizeConfig {
        handles: HandleSpec::parse("tl").expect("handles"),
        ..ResizeConfig::default()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    assert!(engine.is_positioned());

    drag(
        &mut engine,
        &mut doc,
        ResizeEdge::TopLeft,
        PagePoint::new(100, 100),
        PagePoint::new(120, 130),
    );
    assert_eq!(size(&doc, el), (180, 70));
    assert_eq!(doc.xy(el), Some(PagePoint::new(120, 130)));
    let style = doc.style(el).copied().expect("style");
    assert_eq!((style.left, style.top), (Some(120), Some(130)));
}

#[test]
fn ticks_snap_the_delta_and_limits_clamp() {
    let config = ResizeConfig {
        min_width: 50,
        max_width: 300,
        x_ticks: Some(10),
        ..ResizeConfig::default()
    };
    let (mut doc, el) = boxed(100, 100);
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    let origin = PagePoint::new(110, 50);

    drag(&mut engine, &mut doc, ResizeEdge::Right, origin, origin.offset(37, 0));
    assert_eq!(size(&doc, el).0, 140);

    let origin = PagePoint::new(150, 50);
    drag(&mut engine, &mut doc, ResizeEdge::Right, origin, origin.offset(-125, 0));
    assert_eq!(size(&doc, el).0, 50);

    let origin = PagePoint::new(60, 50);
    drag(&mut engine, &mut doc, ResizeEdge::Right, origin, origin.offset(500, 0));
    assert_eq!(size(&doc, el).0, 300);
}

#[test]
fn vetoed_frame_changes_nothing() {
    let (mut doc, el) = boxed(100, 100);
    let config = ResizeConfig {
        status: true,
        ..ResizeConfig::default()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        engine.on_before_resize(move |geometry| {
            seen.borrow_mut().push(*geometry);
            if geometry.width > 120 {
                BeforeResizeVerdict::Cancel
            } else {
                BeforeResizeVerdict::Proceed
            }
        });
    }
    let handle = engine.handle_node(ResizeEdge::Right).expect("handle");
    engine.handle_mouse_down(&doc, handle, PagePoint::new(110, 50), Modifiers::NONE);

    let ok = engine.handle_pointer_move(&mut doc, PagePoint::new(120, 50), Modifiers::NONE);
    assert!(matches!(ok.effect, ResizeEffect::Applied { .. }));
    assert_eq!(size(&doc, el).0, 110);
    let status_text = doc.text(engine.status_node()).map(str::to_owned);

    let vetoed = engine.handle_pointer_move(&mut doc, PagePoint::new(160, 50), Modifiers::NONE);
    assert!(matches!(
        vetoed.effect,
        ResizeEffect::Cancelled { geometry } if geometry.width == 150
    ));
    assert!(vetoed.events.is_empty());
    assert_eq!(size(&doc, el).0, 110);
    assert_eq!(engine.geometry_cache().current.width, 110);
    assert_eq!(doc.text(engine.status_node()).map(str::to_owned), status_text);
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn second_handle_is_ignored_while_a_session_runs() {
    let (mut doc, el) = boxed(100, 100);
    let mut engine = ResizeEngine::new(&mut doc, el, ResizeConfig::default()).expect("engine");
    let right = engine.handle_node(ResizeEdge::Right).expect("right");
    let bottom = engine.handle_node(ResizeEdge::Bottom).expect("bottom");

    engine.handle_mouse_down(&doc, right, PagePoint::new(110, 50), Modifiers::NONE);
    let second = engine.handle_mouse_down(&doc, bottom, PagePoint::new(50, 120), Modifiers::NONE);
    assert_eq!(
        second.ignored_reason(),
        Some(ResizeNoopReason::ActiveDragAlreadyInProgress)
    );
    assert_eq!(second.from, second.to);

    engine.handle_pointer_move(&mut doc, PagePoint::new(130, 50), Modifiers::NONE);
    let third = engine.handle_mouse_down(&doc, bottom, PagePoint::new(50, 120), Modifiers::NONE);
    assert!(third.is_ignored());
    assert_eq!(engine.state(), ResizeState::Resizing { edge: ResizeEdge::Right });
}

#[test]
fn release_before_threshold_runs_no_session() {
    let (mut doc, el) = boxed(100, 100);
    let mut engine = ResizeEngine::new(&mut doc, el, ResizeConfig::default()).expect("engine");
    let handle = engine.handle_node(ResizeEdge::Right).expect("handle");
    engine.handle_mouse_down(&doc, handle, PagePoint::new(110, 50), Modifiers::NONE);
    let jitter = engine.handle_pointer_move(&mut doc, PagePoint::new(111, 50), Modifiers::NONE);
    assert_eq!(
        jitter.ignored_reason(),
        Some(ResizeNoopReason::ThresholdNotReached)
    );
    let up = engine.handle_mouse_up(&mut doc, PagePoint::new(111, 50));
    assert_eq!(up.effect, ResizeEffect::Released { edge: ResizeEdge::Right });
    assert!(up.events.is_empty());
    assert_eq!(size(&doc, el), (100, 100));
}

#[test]
fn stray_input_is_reported_not_applied() {
    let (mut doc, el) = boxed(100, 100);
    let mut engine = ResizeEngine::new(&mut doc, el, ResizeConfig::default()).expect("engine");
    let body = doc.body();
    assert_eq!(
        engine
            .handle_mouse_down(&doc, body, PagePoint::new(0, 0), Modifiers::NONE)
            .ignored_reason(),
        Some(ResizeNoopReason::NotAHandle)
    );
    assert_eq!(
        engine
            .handle_pointer_move(&mut doc, PagePoint::new(5, 5), Modifiers::NONE)
            .ignored_reason(),
        Some(ResizeNoopReason::IdleWithoutActiveDrag)
    );
    assert_eq!(
        engine
            .handle_mouse_up(&mut doc, PagePoint::new(5, 5))
            .ignored_reason(),
        Some(ResizeNoopReason::IdleWithoutActiveDrag)
    );
}

#[test]
fn reset_restores_the_session_start() {
    let (mut doc, el) = boxed(100, 100);
    let mut engine = ResizeEngine::new(&mut doc, el, ResizeConfig::default()).expect("engine");
    drag(
        &mut engine,
        &mut doc,
        ResizeEdge::BottomRight,
        PagePoint::new(110, 120),
        PagePoint::new(150, 140),
    );
    assert_eq!(size(&doc, el), (140, 120));

    let reset = engine.reset(&mut doc);
    assert_eq!(
        reset.effect,
        ResizeEffect::Applied {
            geometry: Geometry::new(100, 100, Some(20), Some(10))
        }
    );
    assert_eq!(size(&doc, el), (100, 100));
    assert_eq!(engine.committed_size().width, 100);
}

#[test]
fn reset_after_several_sessions_restores_only_the_last_start() {
    let mut doc = Document::new();
    let el = doc.create_element(Tag::Div);
    if let Some(style) = doc.style_mut(el) {
        style.position = Position::Absolute;
        style.width = Some(200);
        style.height = Some(100);
    }
    doc.append_child(doc.body(), el).expect("append");
    doc.set_xy(el, PagePoint::new(100, 100)).expect("xy");
    let config = ResizeConfig {
        handles: HandleSpec::parse("tl").expect("handles"),
        ..ResizeConfig::default()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");

    drag(
        &mut engine,
        &mut doc,
        ResizeEdge::TopLeft,
        PagePoint::new(100, 100),
        PagePoint::new(120, 130),
    );
    assert_eq!(size(&doc, el), (180, 70));
    assert_eq!(doc.xy(el), Some(PagePoint::new(120, 130)));

    drag(
        &mut engine,
        &mut doc,
        ResizeEdge::TopLeft,
        PagePoint::new(120, 130),
        PagePoint::new(90, 110),
    );
    assert_eq!(size(&doc, el), (210, 90));
    assert_eq!(doc.xy(el), Some(PagePoint::new(90, 110)));

    let reset = engine.reset(&mut doc);
    assert_eq!(
        reset.effect,
        ResizeEffect::Applied {
            geometry: Geometry::new(70, 180, Some(130), Some(120))
        }
    );
    assert_eq!(size(&doc, el), (180, 70));
    assert_eq!(doc.xy(el), Some(PagePoint::new(120, 130)));
    let style = doc.style(el).copied().expect("style");
    assert_eq!((style.left, style.top), (Some(120), Some(130)));
    assert_eq!(engine.committed_size().width, 180);
}

#[test]
fn status_readout_follows_the_pointer() {
    let (mut doc, el) = boxed(100, 100);
    let config = ResizeConfig {
        status: true,
        ..ResizeConfig::default()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    let status = engine.status_node();
    assert_eq!(doc.first_child(doc.body()), Some(status));
    assert_eq!(doc.style(status).map(|s| s.display), Some(Display::None));

    let handle = engine.handle_node(ResizeEdge::Bottom).expect("handle");
    engine.handle_mouse_down(&doc, handle, PagePoint::new(50, 120), Modifiers::NONE);
    engine.handle_pointer_move(&mut doc, PagePoint::new(50, 100), Modifiers::NONE);
    assert_eq!(doc.text(status), Some("80 x 100 (-20 x 0)"));
    assert_eq!(doc.xy(status), Some(PagePoint::new(62, 112)));
    assert_eq!(doc.style(status).map(|s| s.display), Some(Display::Inline));

    engine.handle_mouse_up(&mut doc, PagePoint::new(50, 100));
    assert_eq!(doc.style(status).map(|s| s.display), Some(Display::None));
}

#[test]
fn shift_locks_the_ratio_for_one_session() {
    let (mut doc, el) = boxed(200, 100);
    let config = ResizeConfig {
        auto_ratio: true,
        ..ResizeConfig::default()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    let handle = engine.handle_node(ResizeEdge::BottomRight).expect("handle");

    engine.handle_mouse_down(&doc, handle, PagePoint::new(210, 120), Modifiers::SHIFT);
    assert!(engine.is_ratio_locked());
    engine.handle_pointer_move(&mut doc, PagePoint::new(250, 120), Modifiers::SHIFT);
    assert_eq!(size(&doc, el), (240, 120));
    engine.handle_mouse_up(&mut doc, PagePoint::new(250, 120));
    assert!(!engine.is_ratio_locked());

    engine.handle_mouse_down(&doc, handle, PagePoint::new(250, 140), Modifiers::NONE);
    engine.handle_pointer_move(&mut doc, PagePoint::new(260, 140), Modifiers::NONE);
    assert_eq!(size(&doc, el), (250, 120));
}
