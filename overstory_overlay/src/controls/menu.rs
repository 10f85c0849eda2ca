// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use overstory_commands::{Command, CommandList};
use overstory_element_tree::ElementId;

use super::{Cascading, OverlayBehavior};
use crate::{OverlayError, OverlayHost, OverlayId, OverlayOptions, Renderer};

/// A cascading flyout whose content is a list of commands.
///
/// Invoking a flyout command opens its target anchored at the command's
/// element, extending the cascade. Invoking a button or toggle collapses the
/// whole cascade.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    overlay: OverlayId,
    element: ElementId,
}

impl Menu {
    /// Host a menu in `element` with the given commands.
    pub fn new<R: Renderer>(
        host: &mut OverlayHost<R>,
        element: ElementId,
        options: OverlayOptions,
        commands: impl IntoIterator<Item = Command<OverlayId>>,
    ) -> Result<Self, OverlayError> {
        let list = CommandList::new(commands)?;
        let overlay = host.create(element, options.with_cascading(true))?;
        host.set_commands(overlay, list);
        Ok(Self { overlay, element })
    }

    /// The hosting element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// The command list.
    pub fn commands<'h, R: Renderer>(
        &self,
        host: &'h OverlayHost<R>,
    ) -> Option<&'h CommandList<OverlayId>> {
        host.commands(self.overlay)
    }

    /// Look up a command by id.
    pub fn get_command_by_id<'h, R: Renderer>(
        &self,
        host: &'h OverlayHost<R>,
        id: &str,
    ) -> Option<&'h Command<OverlayId>> {
        self.commands(host)?.get_command_by_id(id)
    }

    /// Invoke the command `id`.
    pub fn invoke<R: Renderer>(&self, host: &mut OverlayHost<R>, id: &str) -> Result<(), OverlayError> {
        host.invoke_command(self.overlay, id)
    }

    /// Unhide the named commands.
    pub fn show_commands<R: Renderer>(
        &self,
        host: &mut OverlayHost<R>,
        ids: &[&str],
    ) -> Result<(), OverlayError> {
        host.show_commands(self.overlay, ids)
    }

    /// Hide the named commands.
    pub fn hide_commands<R: Renderer>(
        &self,
        host: &mut OverlayHost<R>,
        ids: &[&str],
    ) -> Result<(), OverlayError> {
        host.hide_commands(self.overlay, ids)
    }

    /// Show exactly the named commands.
    pub fn show_only_commands<R: Renderer>(
        &self,
        host: &mut OverlayHost<R>,
        ids: &[&str],
    ) -> Result<(), OverlayError> {
        host.show_only_commands(self.overlay, ids)
    }
}

impl OverlayBehavior for Menu {
    fn overlay(&self) -> OverlayId {
        self.overlay
    }
}

impl Cascading for Menu {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Instant, OverlayEventKind};
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use kurbo::Rect;
    use overstory_commands::CommandKind;
    use overstory_element_tree::{ElementTree, LocalElement};

    struct Fixture {
        host: OverlayHost<Instant>,
        button: ElementId,
        root: Menu,
        sub: Menu,
        leaf: Menu,
    }

    /// root --"more"--> sub --"deeper"--> leaf
    fn fixture() -> Fixture {
        let mut host = OverlayHost::new(ElementTree::new(), Instant);
        let doc = host.tree().document();
        let tree = host.tree_mut();
        let button = tree.insert(Some(doc), LocalElement::focusable(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let mut menu_with_items = |n: usize| {
            let el = tree.insert(Some(doc), LocalElement::default());
            let items: Vec<_> = (0..n)
                .map(|i| {
                    let y = 20.0 * i as f64;
                    tree.insert(Some(el), LocalElement::focusable(Rect::new(0.0, y, 80.0, y + 18.0)))
                })
                .collect();
            (el, items)
        };
        let (root_el, root_items) = menu_with_items(3);
        let (sub_el, sub_items) = menu_with_items(2);
        let (leaf_el, leaf_items) = menu_with_items(1);

        let leaf = Menu::new(
            &mut host,
            leaf_el,
            OverlayOptions::default(),
            [Command::new("paste", CommandKind::Button).with_element(leaf_items[0])],
        )
        .unwrap();
        let sub = Menu::new(
            &mut host,
            sub_el,
            OverlayOptions::default(),
            [
                Command::new("deeper", CommandKind::Flyout)
                    .with_element(sub_items[0])
                    .with_flyout(leaf.overlay()),
                Command::new("wrap", CommandKind::Toggle).with_element(sub_items[1]),
            ],
        )
        .unwrap();
        let root = Menu::new(
            &mut host,
            root_el,
            OverlayOptions::default(),
            [
                Command::new("copy", CommandKind::Button).with_element(root_items[0]),
                Command::new("sep", CommandKind::Separator).with_element(root_items[1]),
                Command::new("more", CommandKind::Flyout)
                    .with_element(root_items[2])
                    .with_flyout(sub.overlay()),
            ],
        )
        .unwrap();
        Fixture {
            host,
            button,
            root,
            sub,
            leaf,
        }
    }

    #[test]
    fn flyout_commands_chain_menus() {
        let Fixture {
            mut host,
            button,
            root,
            sub,
            leaf,
        } = fixture();
        root.show_at(&mut host, button);
        root.invoke(&mut host, "more").unwrap();
        sub.invoke(&mut host, "deeper").unwrap();
        assert_eq!(host.cascade(), &[root.overlay(), sub.overlay(), leaf.overlay()]);

        let more = root.get_command_by_id(&host, "more").and_then(|c| c.element);
        assert_eq!(sub.anchor(&host), more);

        root.invoke(&mut host, "more").unwrap();
        assert_eq!(
            host.cascade(),
            &[root.overlay(), sub.overlay(), leaf.overlay()],
            "showing a shown menu changes nothing"
        );
        host.hide(leaf.overlay());
        assert_eq!(host.cascade(), &[root.overlay(), sub.overlay()]);
    }

    #[test]
    fn buttons_and_toggles_collapse_the_cascade() {
        let Fixture {
            mut host,
            button,
            root,
            sub,
            ..
        } = fixture();
        let hides = Rc::new(RefCell::new(Vec::new()));
        let sink = hides.clone();
        host.on_event(move |e, _| {
            if e.kind == OverlayEventKind::AfterHide {
                sink.borrow_mut().push(e.overlay);
            }
        });

        root.show_at(&mut host, button);
        root.invoke(&mut host, "more").unwrap();
        sub.invoke(&mut host, "wrap").unwrap();
        assert!(host.cascade().is_empty());
        assert_eq!(*hides.borrow(), [sub.overlay(), root.overlay()]);
        assert!(sub.get_command_by_id(&host, "wrap").unwrap().selected);
        assert_eq!(host.focused(), Some(button));

        root.show_at(&mut host, button);
        root.invoke(&mut host, "sep").unwrap();
        assert!(!root.is_hidden(&host), "separators do nothing");
    }

    #[test]
    fn hidden_flyout_commands_do_not_chain() {
        let Fixture {
            mut host,
            button,
            root,
            sub,
            ..
        } = fixture();
        root.show_at(&mut host, button);
        root.hide_commands(&mut host, &["more"]).unwrap();
        root.invoke(&mut host, "more").unwrap();
        assert!(sub.is_hidden(&host));

        root.show_only_commands(&mut host, &["more"]).unwrap();
        let visible: Vec<_> = root
            .commands(&host)
            .unwrap()
            .visible()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(visible, ["more"]);
        assert!(root.show_commands(&mut host, &["missing"]).is_err());
    }

    #[test]
    fn arrow_keys_walk_the_menu() {
        let Fixture {
            mut host,
            button,
            root,
            sub,
            ..
        } = fixture();
        root.show_at(&mut host, button);
        let items: Vec<_> = root
            .commands(&host)
            .unwrap()
            .commands()
            .iter()
            .filter_map(|c| c.element)
            .collect();
        assert_eq!(host.focused(), Some(items[0]));

        assert!(host.key_down(crate::Key::Down));
        assert!(host.key_down(crate::Key::Down));
        assert_eq!(host.focused(), Some(items[2]));
        assert!(host.key_down(crate::Key::Right));
        assert_eq!(host.cascade(), &[root.overlay(), sub.overlay()]);
        assert!(host.key_down(crate::Key::Left));
        assert_eq!(host.cascade(), &[root.overlay()]);
        assert_eq!(host.focused(), Some(items[2]), "focus returns to the chaining command");
    }

    #[test]
    fn duplicate_command_ids_fail_construction() {
        let mut host = OverlayHost::new(ElementTree::new(), Instant);
        let doc = host.tree().document();
        let el = host.tree_mut().insert(Some(doc), LocalElement::default());
        let err = Menu::new(
            &mut host,
            el,
            OverlayOptions::default(),
            [
                Command::new("a", CommandKind::Button),
                Command::new("a", CommandKind::Toggle),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            OverlayError::InvalidOption {
                option: "commands",
                value: "a".into()
            }
        );
        assert_eq!(host.control_for(el), None);
    }
}
