//! Proxy sessions: the stand-in takes every frame, the element changes on
//! release, optionally through the commit animation.

use std::time::Duration;

use fwidget_dom::{Document, Modifiers, NodeId, PagePoint, Tag, Visibility};
use fwidget_resize::{
    DragController, ResizeConfig, ResizeEdge, ResizeEffect, ResizeEngine, ResizeEvent,
    ThresholdDrag, css,
};
use pretty_assertions::assert_eq;

fn boxed() -> (Document, NodeId) {
    let mut doc = Document::new();
    let el = doc.create_element(Tag::Div);
    if let Some(style) = doc.style_mut(el) {
        style.width = Some(100);
        style.height = Some(100);
    }
    doc.append_child(doc.body(), el).expect("append");
    doc.set_offset(el, PagePoint::new(10, 20)).expect("offset");
    (doc, el)
}

fn proxy_config() -> ResizeConfig {
    ResizeConfig {
        proxy: true,
        ..ResizeConfig::default()
    }
}

fn begin(engine: &mut ResizeEngine, doc: &mut Document) {
    let handle = engine.handle_node(ResizeEdge::Right).expect("handle");
    engine.handle_mouse_down(doc, handle, PagePoint::new(110, 50), Modifiers::NONE);
    engine.handle_pointer_move(doc, PagePoint::new(140, 50), Modifiers::NONE);
}

#[test]
fn proxy_takes_frames_and_element_commits_on_release() {
    let (mut doc, el) = boxed();
    let mut engine = ResizeEngine::new(&mut doc, el, proxy_config()).expect("engine");
    let proxy = engine.proxy_node().expect("proxy");
    assert_eq!(doc.style(proxy).map(|s| s.visibility), Some(Visibility::Hidden));

    let handle = engine.handle_node(ResizeEdge::Right).expect("handle");
    engine.handle_mouse_down(&doc, handle, PagePoint::new(110, 50), Modifiers::NONE);
    let frame = engine.handle_pointer_move(&mut doc, PagePoint::new(140, 50), Modifiers::NONE);
    assert!(matches!(
        frame.events.last(),
        Some(ResizeEvent::ProxyResize { geometry }) if geometry.width == 130
    ));
    assert_eq!(doc.client_width(proxy), 130);
    assert_eq!(doc.xy(proxy), Some(PagePoint::new(10, 20)));
    assert_eq!(doc.client_width(el), 100);
    assert_eq!(doc.style(proxy).map(|s| s.visibility), Some(Visibility::Visible));

    let up = engine.handle_mouse_up(&mut doc, PagePoint::new(140, 50));
    assert_eq!(doc.client_width(el), 130);
    assert_eq!(doc.style(proxy).map(|s| s.visibility), Some(Visibility::Hidden));
    assert!(matches!(up.effect, ResizeEffect::Ended { .. }));
    let kinds: Vec<&str> = up
        .events
        .iter()
        .map(|e| match e {
            ResizeEvent::Resize { .. } => "resize",
            ResizeEvent::EndResize { .. } => "end",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["resize", "end"]);
}

#[test]
fn ghost_class_lasts_for_the_session() {
    let (mut doc, el) = boxed();
    let config = ResizeConfig {
        ghost: true,
        ..proxy_config()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    begin(&mut engine, &mut doc);
    assert!(doc.has_class(el, css::GHOST));
    engine.handle_mouse_up(&mut doc, PagePoint::new(140, 50));
    assert!(!doc.has_class(el, css::GHOST));
}

#[test]
fn without_set_size_only_the_notification_carries_the_size() {
    let (mut doc, el) = boxed();
    let config = ResizeConfig {
        set_size: false,
        ..proxy_config()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    begin(&mut engine, &mut doc);
    let up = engine.handle_mouse_up(&mut doc, PagePoint::new(140, 50));
    assert_eq!(doc.client_width(el), 100);
    assert!(
        up.events
            .iter()
            .any(|e| matches!(e, ResizeEvent::Resize { geometry } if geometry.width == 130))
    );
}

#[test]
fn animated_commit_tweens_then_settles() {
    let (mut doc, el) = boxed();
    let config = ResizeConfig {
        animate: true,
        ..proxy_config()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    begin(&mut engine, &mut doc);

    let up = engine.handle_mouse_up(&mut doc, PagePoint::new(140, 50));
    assert!(matches!(up.effect, ResizeEffect::Animating { geometry, .. } if geometry.width == 130));
    assert!(engine.is_animating());
    assert_eq!(doc.client_width(el), 100);
    assert_eq!(engine.committed_size().width, 100);

    let midway = engine.advance_animations(&mut doc, Duration::from_millis(250));
    assert!(midway.is_empty());
    let width = doc.client_width(el);
    assert!(width > 100 && width < 130, "width {width}");

    let done = engine.advance_animations(&mut doc, Duration::from_millis(300));
    assert_eq!(doc.client_width(el), 130);
    assert_eq!(engine.committed_size().width, 130);
    assert!(!engine.is_animating());
    assert!(matches!(done.as_slice(), [ResizeEvent::Resize { .. }]));
}

#[test]
fn oversized_animation_duration_uses_the_default() {
    let (mut doc, el) = boxed();
    let config = ResizeConfig {
        animate: true,
        animate_duration: 1e20,
        ..proxy_config()
    };
    let mut engine = ResizeEngine::new(&mut doc, el, config).expect("engine");
    assert_eq!(engine.config().animate_duration, 0.5);
    begin(&mut engine, &mut doc);

    let up = engine.handle_mouse_up(&mut doc, PagePoint::new(140, 50));
    assert!(matches!(up.effect, ResizeEffect::Animating { .. }));
    engine.advance_animations(&mut doc, Duration::from_millis(550));
    assert_eq!(doc.client_width(el), 130);
    assert!(!engine.is_animating());
}

#[test]
fn animate_falls_back_to_direct_commit_without_a_driver() {
    let (mut doc, el) = boxed();
    let config = ResizeConfig {
        animate: true,
        ..proxy_config()
    };
    let mut engine = ResizeEngine::with_capabilities(
        &mut doc,
        el,
        config,
        |_| Box::new(ThresholdDrag::new(0)) as Box<dyn DragController>,
        None,
    )
    .expect("engine");
    assert!(!engine.config().animate);
    begin(&mut engine, &mut doc);
    let up = engine.handle_mouse_up(&mut doc, PagePoint::new(140, 50));
    assert!(matches!(up.effect, ResizeEffect::Ended { .. }));
    assert_eq!(doc.client_width(el), 130);
}
