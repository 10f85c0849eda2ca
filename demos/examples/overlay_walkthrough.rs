// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A menu cascade, light dismiss and a tooltip, driven by hand.
//!
//! This example shows:
//! - chaining menus through flyout commands and collapsing them with Alt,
//! - a listener that asks for a show while the cascade is collapsing,
//! - the click-eater dismissing a flyout but not a sticky app bar,
//! - a tooltip driven by caller timestamps.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p overstory_demos --example overlay_walkthrough`

use kurbo::{Point, Rect};
use overstory_commands::{Command, CommandKind};
use overstory_element_tree::{ElementId, ElementTree, LocalElement};
use overstory_overlay::controls::{AppBar, Cascading, Flyout, Menu, OverlayBehavior};
use overstory_overlay::{
    AppBarOptions, ClosedDisplayMode, Instant, Key, OverlayEventKind, OverlayHost, OverlayOptions,
};
use overstory_tooltip::{
    Modality, PointerKind, ReshowClock, Tooltip, TooltipInput, TooltipOptions,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A menu element with `n` focusable rows starting at `origin`.
fn menu_element(host: &mut OverlayHost<Instant>, origin: Point, n: usize) -> (ElementId, Vec<ElementId>) {
    let doc = host.tree().document();
    let tree = host.tree_mut();
    let height = 24.0 * n as f64;
    let el = tree.insert(
        Some(doc),
        LocalElement::with_bounds(Rect::new(origin.x, origin.y, origin.x + 160.0, origin.y + height)),
    );
    let rows = (0..n)
        .map(|i| {
            let y = origin.y + 24.0 * i as f64;
            tree.insert(
                Some(el),
                LocalElement::focusable(Rect::new(origin.x, y, origin.x + 160.0, y + 22.0)),
            )
        })
        .collect();
    (el, rows)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut host = OverlayHost::new(ElementTree::with_viewport(Rect::new(0.0, 0.0, 1024.0, 768.0)), Instant);
    let doc = host.tree().document();
    let file_button = host
        .tree_mut()
        .insert(Some(doc), LocalElement::focusable(Rect::new(8.0, 8.0, 64.0, 32.0)));

    host.on_event(|event, _| {
        info!(overlay = ?event.overlay, kind = ?event.kind, "event");
    });

    // File ▸ Recent ▸ (two files)
    let (recent_el, recent_rows) = menu_element(&mut host, Point::new(170.0, 60.0), 2);
    let recent = Menu::new(
        &mut host,
        recent_el,
        OverlayOptions::default(),
        [
            Command::new("report.txt", CommandKind::Button).with_element(recent_rows[0]),
            Command::new("notes.md", CommandKind::Button).with_element(recent_rows[1]),
        ],
    )
    .expect("valid recent menu");
    let (file_el, file_rows) = menu_element(&mut host, Point::new(8.0, 36.0), 3);
    let file = Menu::new(
        &mut host,
        file_el,
        OverlayOptions::default(),
        [
            Command::new("open", CommandKind::Button).with_element(file_rows[0]),
            Command::new("recent", CommandKind::Flyout)
                .with_element(file_rows[1])
                .with_flyout(recent.overlay()),
            Command::new("quit", CommandKind::Button).with_element(file_rows[2]),
        ],
    )
    .expect("valid file menu");

    host.focus_changed(Some(file_button));
    file.show_at(&mut host, file_button);
    host.key_down(Key::Down);
    host.key_down(Key::Right);
    println!("cascade after File > Recent: {:?}", host.cascade());
    println!("focused: {:?}", host.focused());

    host.key_down(Key::Alt);
    println!("after Alt: cascade {:?}, focus back on {:?}", host.cascade(), host.focused());

    // A listener that reopens File while the cascade is collapsing. The show
    // waits for the collapse to finish.
    let file_id = file.overlay();
    let recent_id = recent.overlay();
    host.on_event(move |event, requests| {
        if event.overlay == recent_id && event.kind == OverlayEventKind::BeforeHide {
            requests.show_at(file_id, file_button);
        }
    });
    file.show_at(&mut host, file_button);
    file.invoke(&mut host, "recent").expect("known command");
    host.collapse_all();
    println!("after collapse with a reentrant show: {:?}", host.cascade());
    host.collapse_all();

    // A sticky app bar with a flyout command.
    let bar_el = host
        .tree_mut()
        .insert(Some(doc), LocalElement::with_bounds(Rect::new(0.0, 700.0, 1024.0, 768.0)));
    let more = host
        .tree_mut()
        .insert(Some(bar_el), LocalElement::focusable(Rect::new(960.0, 710.0, 1010.0, 760.0)));
    let (details_el, _) = menu_element(&mut host, Point::new(800.0, 560.0), 2);
    let details = Flyout::new(&mut host, details_el, OverlayOptions::default()).expect("free element");
    let bar = AppBar::new(
        &mut host,
        bar_el,
        AppBarOptions::default()
            .with_sticky(true)
            .with_closed_display_mode(ClosedDisplayMode::Minimal),
        [Command::new("more", CommandKind::Flyout)
            .with_element(more)
            .with_flyout(details.overlay())],
    )
    .expect("valid app bar");
    println!("closed app bar: {:?}", bar.visible_position(&host));
    bar.open(&mut host);
    bar.invoke(&mut host, "more").expect("known command");
    println!("flyout open: {}", !details.is_hidden(&host));

    let dismissed = host.pointer_down_at(Point::new(400.0, 300.0));
    println!(
        "click outside dismissed={dismissed}; flyout hidden={}, bar open={}",
        details.is_hidden(&host),
        bar.opened(&host)
    );

    // Tooltip: mouse hover, then a quick reshow on a neighbor.
    let mut clock = ReshowClock::default();
    let mut tip = Tooltip::new(TooltipOptions::default().with_content_len(12));
    let mut now = 0;
    tip.handle(TooltipInput::PointerOver(PointerKind::Mouse), now, &mut clock);
    while let Some(deadline) = tip.next_deadline() {
        now = deadline;
        for event in tip.poll(now, &mut clock) {
            println!("tooltip at {now} ms: {event:?}");
        }
        if tip.is_visible() {
            break;
        }
    }
    for event in tip.finish_animation(now, &mut clock) {
        println!("tooltip at {now} ms: {event:?}");
    }
    now += 50;
    tip.handle(TooltipInput::PointerOut(PointerKind::Mouse), now, &mut clock);
    tip.finish_animation(now, &mut clock);

    let mut neighbor = Tooltip::new(TooltipOptions::default().with_content_len(8));
    neighbor.handle(TooltipInput::PointerOver(PointerKind::Mouse), now + 100, &mut clock);
    println!(
        "neighbor hovered at {} ms shows at {:?} (reshow)",
        now + 100,
        neighbor.next_deadline()
    );
    neighbor.open(Some(Modality::Keyboard), now + 120, &mut clock);
    println!("neighbor opened explicitly: {}", neighbor.is_visible());

    host.shutdown();
}
