//! Declarative UI trees.
//!
//! Effects describe their controls as a [`UiNode`] tree bound to parameter
//! keys. Hosts render it however they like; the JSON form is
//! `{"type": "slider", "key": "strength", ...}`.

use serde::{Deserialize, Serialize};

/// Layout direction of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Col,
    Row,
}

/// Numeric type a slider edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float,
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UiNode {
    Group {
        direction: Direction,
        children: Vec<UiNode>,
    },
    Slider {
        key: String,
        label: String,
        #[serde(rename = "dataType")]
        data_type: DataType,
        min: f64,
        max: f64,
        value: f64,
    },
    Select {
        key: String,
        label: String,
        value: String,
        options: Vec<SelectOption>,
    },
    Text {
        text: String,
    },
    Separator,
}

impl UiNode {
    /// Parameter keys bound by this tree, depth-first.
    pub fn keys(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_keys(&mut out);
        out
    }

    fn collect_keys<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Group { children, .. } => children.iter().for_each(|c| c.collect_keys(out)),
            Self::Slider { key, .. } | Self::Select { key, .. } => out.push(key),
            Self::Text { .. } | Self::Separator => {}
        }
    }
}

pub fn group(direction: Direction, children: Vec<UiNode>) -> UiNode {
    UiNode::Group { direction, children }
}

pub fn col(children: Vec<UiNode>) -> UiNode {
    group(Direction::Col, children)
}

pub fn row(children: Vec<UiNode>) -> UiNode {
    group(Direction::Row, children)
}

pub fn slider(key: &str, label: &str, data_type: DataType, range: (f64, f64), value: f64) -> UiNode {
    UiNode::Slider {
        key: key.to_string(),
        label: label.to_string(),
        data_type,
        min: range.0,
        max: range.1,
        value,
    }
}

/// Select whose option labels are the values themselves.
pub fn select(key: &str, label: &str, value: &str, options: &[&str]) -> UiNode {
    select_labeled(key, label, value, &options.iter().map(|o| (*o, *o)).collect::<Vec<_>>())
}

/// Select with `(value, label)` options.
pub fn select_labeled(key: &str, label: &str, value: &str, options: &[(&str, &str)]) -> UiNode {
    UiNode::Select {
        key: key.to_string(),
        label: label.to_string(),
        value: value.to_string(),
        options: options
            .iter()
            .map(|(value, label)| SelectOption { value: value.to_string(), label: label.to_string() })
            .collect(),
    }
}

pub fn text(text: &str) -> UiNode {
    UiNode::Text { text: text.to_string() }
}

pub fn separator() -> UiNode {
    UiNode::Separator
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape() {
        let node = col(vec![
            slider("strength", "Strength", DataType::Float, (0.0, 200.0), 1.0),
            separator(),
        ]);
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(
            v,
            json!({
                "type": "group",
                "direction": "col",
                "children": [
                    {"type": "slider", "key": "strength", "label": "Strength", "dataType": "float",
                     "min": 0.0, "max": 200.0, "value": 1.0},
                    {"type": "separator"}
                ]
            })
        );
        let back: UiNode = serde_json::from_value(v).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_keys() {
        let node = col(vec![
            row(vec![select("mode", "Mode", "a", &["a", "b"])]),
            text("hint"),
            slider("x", "X", DataType::Int, (0.0, 10.0), 3.0),
        ]);
        assert_eq!(node.keys(), vec!["mode", "x"]);
    }
}
