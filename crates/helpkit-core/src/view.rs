//! Declarative description of what the widget should show for a turn.
//! A rendering adapter walks the tree; the engine never touches a DOM.

use serde::Serialize;

use crate::format::escape_html;
use crate::session::TurnResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewNode {
    Group { children: Vec<ViewNode> },
    /// `html` is already escaped and safe to inject.
    Message { role: Role, html: String },
    Chips { labels: Vec<String> },
}

/// Echo of the user's text (if any), the bot reply, then the chip row.
pub fn describe_turn(user_text: Option<&str>, turn: &TurnResult) -> ViewNode {
    let mut children = Vec::with_capacity(3);
    if let Some(text) = user_text {
        children.push(ViewNode::Message {
            role: Role::User,
            html: escape_html(text.trim()),
        });
    }
    children.push(ViewNode::Message {
        role: Role::Bot,
        html: turn.reply.clone(),
    });
    if !turn.suggestions.is_empty() {
        children.push(ViewNode::Chips {
            labels: turn.suggestions.clone(),
        });
    }
    ViewNode::Group { children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Resolution;

    fn turn(suggestions: &[&str]) -> TurnResult {
        TurnResult {
            reply: "Open <a href=\"/alumni\">/alumni</a>".into(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
            topic: Some("alumni".into()),
            resolution: Resolution::Alias,
        }
    }

    #[test]
    fn test_describe_turn_escapes_user_text() {
        let view = describe_turn(Some(" <b>alumni</b> "), &turn(&["Profile"]));
        let ViewNode::Group { children } = view else {
            panic!("expected group");
        };
        assert_eq!(children.len(), 3);
        assert_eq!(
            children[0],
            ViewNode::Message {
                role: Role::User,
                html: "&lt;b&gt;alumni&lt;/b&gt;".into()
            }
        );
        assert_eq!(
            children[2],
            ViewNode::Chips {
                labels: vec!["Profile".into()]
            }
        );
    }

    #[test]
    fn test_describe_turn_without_echo_or_chips() {
        let view = describe_turn(None, &turn(&[]));
        let ViewNode::Group { children } = view else {
            panic!("expected group");
        };
        assert_eq!(children.len(), 1);
        assert!(matches!(&children[0], ViewNode::Message { role: Role::Bot, .. }));
    }

    #[test]
    fn test_view_serializes_tagged() {
        let json = serde_json::to_value(describe_turn(None, &turn(&["Profile"]))).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["children"][0]["type"], "message");
        assert_eq!(json["children"][0]["role"], "bot");
        assert_eq!(json["children"][1]["labels"][0], "Profile");
    }
}
