use super::{
    BUBBLE_ANCHOR_CLASS, CODE_COPY_CLASS, EXPANDER_ATTR, EXPANDER_CLASS, THINKING_BUTTON_CLASS,
    THINKING_HEADER_CLASS, Turn, TurnKind, compile_regex,
};
use crate::dom::{Dom, Element, NodeId};
use crate::report::Summary;
use crate::selector::Selector;
use std::collections::HashSet;
use std::sync::LazyLock;

const ICON_TAG: &str = "mat-icon";
const MATERIAL_BUTTON_CLASS: &str = "mat-mdc-button-base";

const EXPANDER_ICONS: &[&str] = &[
    "expand_more",
    "expand_less",
    "keyboard_arrow_down",
    "keyboard_arrow_up",
    "chevron_right",
    "chevron_left",
];

const COPY_ICON: &str = "content_copy";

static THINKING_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::any_tag(&["model-thoughts", "thought-process"]));
static THINKING_CLASS: LazyLock<Selector> =
    LazyLock::new(|| Selector::class_pattern(&[], compile_regex("thought|reasoning")));

static CODE_BLOCK: LazyLock<Selector> = LazyLock::new(|| Selector::any_tag(&["pre", "code-block"]));
static CODE_CLASS: LazyLock<Selector> =
    LazyLock::new(|| Selector::class_pattern(&["div"], compile_regex("code|syntax")));

/// Ripple, focus and state-indicator spans.
static DECORATION: LazyLock<Selector> =
    LazyLock::new(|| Selector::class_pattern(&["span"], compile_regex("ripple|focus|indicator")));

/// Where a user turn's expander goes, first existing target wins.
static BUBBLES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::Class("user-query-bubble-with-background".into()),
        Selector::TagClassContains {
            tag: "span".into(),
            needle: "bubble".into(),
        },
        Selector::Class("query-content".into()),
    ]
});

/// What to do with one icon-bearing button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonClass {
    /// Expand/collapse toggle. `thinking` when it sits in a reasoning block.
    Expander { thinking: bool },
    /// Copy button of a code block.
    CodeCopy,
    Discard,
}

fn is_button_container(element: &Element) -> bool {
    element.is("button") || element.has_class(MATERIAL_BUTTON_CLASS)
}

fn is_marked(element: &Element) -> bool {
    element.has_class(EXPANDER_CLASS) || element.has_class(CODE_COPY_CLASS)
}

/// Nearest button container above `icon`, not looking past `turn`.
fn button_for(dom: &Dom, icon: NodeId, turn: NodeId) -> Option<NodeId> {
    dom.ancestors(icon)
        .take_while(|a| *a != turn)
        .find(|a| dom.element(*a).is_some_and(is_button_container))
}

/// The icon's explicit name attribute, else its trimmed text.
pub fn icon_name(dom: &Dom, icon: NodeId) -> String {
    let named = dom.element(icon).and_then(|e| {
        ["data-mat-icon-name", "fonticon"]
            .into_iter()
            .filter_map(|attr| e.attrs.get(attr))
            .map(str::trim)
            .find(|v| !v.is_empty())
    });
    match named {
        Some(name) => name.to_string(),
        None => dom.text_content(icon).trim().to_string(),
    }
}

/// Decide a button's fate from its icon name and where it sits.
pub fn classify_button(dom: &Dom, button: NodeId, icon_name: &str) -> ButtonClass {
    if EXPANDER_ICONS.contains(&icon_name) {
        let thinking = THINKING_BLOCK.closest(dom, button).is_some()
            || THINKING_CLASS.closest(dom, button).is_some();
        return ButtonClass::Expander { thinking };
    }
    let in_code =
        CODE_BLOCK.closest(dom, button).is_some() || CODE_CLASS.closest(dom, button).is_some();
    if icon_name == COPY_ICON && in_code {
        ButtonClass::CodeCopy
    } else {
        ButtonClass::Discard
    }
}

/// Classify every icon-bearing button in `turn` and apply the outcome:
/// mark and possibly move expanders, mark code-copy buttons, remove the
/// rest. Buttons left without a marker afterwards are removed as well, so
/// every surviving container carries one.
pub fn process_buttons(dom: &mut Dom, turn: &Turn, summary: &mut Summary) {
    flatten_nested_buttons(dom, turn.id);
    let mut decided = HashSet::new();

    for icon in dom.find_all(turn.id, |e| e.is(ICON_TAG)) {
        if !dom.contains(turn.id, icon) {
            continue;
        }
        let Some(button) = button_for(dom, icon, turn.id) else {
            continue;
        };
        if !decided.insert(button) {
            continue;
        }

        let name = icon_name(dom, icon);
        let class = classify_button(dom, button, &name);
        tracing::trace!(icon = %name, ?class, "classified button");

        match class {
            ButtonClass::Expander { thinking } => {
                mark_expander(dom, button, thinking);
                if thinking {
                    summary.thinking_expanders += 1;
                } else {
                    relocate_expander(dom, turn, button);
                }
                summary.expanders += 1;
            }
            ButtonClass::CodeCopy => {
                dom.add_class(button, CODE_COPY_CLASS);
                summary.code_copy_buttons += 1;
            }
            ButtonClass::Discard => {
                dom.remove(button);
                summary.discarded_buttons += 1;
                continue;
            }
        }
        strip_decoration(dom, button);
    }

    summary.discarded_buttons += remove_unmarked_buttons(dom, turn.id);
}

fn mark_expander(dom: &mut Dom, button: NodeId, thinking: bool) {
    dom.add_class(button, EXPANDER_CLASS);
    dom.set_attr(button, EXPANDER_ATTR, "true");
    if thinking {
        dom.add_class(button, THINKING_BUTTON_CLASS);
        if let Some(header) = dom.parent(button) {
            dom.add_class(header, THINKING_HEADER_CLASS);
        }
    }
}

/// Move an ordinary expander to the front of the user's bubble, or to the
/// front of the turn when there is no bubble (always the case for model
/// turns).
fn relocate_expander(dom: &mut Dom, turn: &Turn, button: NodeId) {
    if turn.kind == TurnKind::User {
        let bubble = BUBBLES
            .iter()
            .find_map(|selector| selector.select_first(dom, turn.id));
        if let Some(bubble) = bubble.filter(|b| !dom.contains(button, *b)) {
            dom.prepend_child(bubble, button);
            dom.add_class(bubble, BUBBLE_ANCHOR_CLASS);
            return;
        }
    }
    if dom.parent(button) != Some(turn.id) {
        dom.prepend_child(turn.id, button);
    }
}

fn strip_decoration(dom: &mut Dom, button: NodeId) {
    for span in DECORATION.select(dom, button) {
        if dom.contains(button, span) {
            dom.remove(span);
        }
    }
}

/// Unwrap every button container that holds another one, leaving a single
/// (innermost) container around each icon.
fn flatten_nested_buttons(dom: &mut Dom, turn: NodeId) {
    for button in dom.find_all(turn, is_button_container) {
        if dom.find_first(button, is_button_container).is_some() {
            tracing::trace!("unwrapping nested button container");
            dom.replace_with_children(button);
        }
    }
}

/// Remove button containers that received no marker. One that ended up
/// wrapping a marked button is unwrapped instead, keeping what it holds.
/// Returns how many were removed.
fn remove_unmarked_buttons(dom: &mut Dom, turn: NodeId) -> usize {
    let mut removed = 0;
    for button in dom.find_all(turn, is_button_container) {
        if !dom.contains(turn, button) || dom.element(button).is_some_and(is_marked) {
            continue;
        }
        if dom.find_first(button, is_marked).is_some() {
            dom.replace_with_children(button);
        } else {
            tracing::trace!("removing unmarked button");
            dom.remove(button);
            removed += 1;
        }
    }
    removed
}
