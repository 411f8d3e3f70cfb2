//! Operator kinds and the attribute lookups they bind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A tagged category of task-graph node.
///
/// Labels (see [`OpKind::label`]) are the operator names the external task
/// evaluator understands, so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OpKind {
    GetCategory,
    GetLoc,
    GetViewAngle,
    GetObject,
    Exist,
    IsSame,
    NotSame,
    And,
    Or,
    Xor,
    Select,
    Switch,
    /// Sentinel for an optional child slot left empty. Never materialized.
    #[serde(rename = "None")]
    Nil,
}

impl OpKind {
    pub const ALL: [OpKind; 13] = [
        OpKind::GetCategory,
        OpKind::GetLoc,
        OpKind::GetViewAngle,
        OpKind::GetObject,
        OpKind::Exist,
        OpKind::IsSame,
        OpKind::NotSame,
        OpKind::And,
        OpKind::Or,
        OpKind::Xor,
        OpKind::Select,
        OpKind::Switch,
        OpKind::Nil,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OpKind::GetCategory => "GetCategory",
            OpKind::GetLoc => "GetLoc",
            OpKind::GetViewAngle => "GetViewAngle",
            OpKind::GetObject => "GetObject",
            OpKind::Exist => "Exist",
            OpKind::IsSame => "IsSame",
            OpKind::NotSame => "NotSame",
            OpKind::And => "And",
            OpKind::Or => "Or",
            OpKind::Xor => "Xor",
            OpKind::Select => "Select",
            OpKind::Switch => "Switch",
            OpKind::Nil => "None",
        }
    }

    /// The attribute this kind looks up, if it is an attribute lookup.
    pub fn attribute(&self) -> Option<Attribute> {
        match self {
            OpKind::GetCategory => Some(Attribute::Category),
            OpKind::GetLoc => Some(Attribute::Location),
            OpKind::GetViewAngle => Some(Attribute::ViewAngle),
            OpKind::GetObject => Some(Attribute::Object),
            _ => None,
        }
    }

    #[inline]
    pub fn is_attribute_lookup(&self) -> bool {
        self.attribute().is_some()
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, OpKind::Nil)
    }

    /// Kinds whose result is a boolean, usable as a switch condition.
    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            OpKind::Exist | OpKind::IsSame | OpKind::NotSame | OpKind::And | OpKind::Or | OpKind::Xor
        )
    }

    /// Only the composer creates `Switch` nodes; the builder cannot start from one.
    #[inline]
    pub fn is_generatable(&self) -> bool {
        !matches!(self, OpKind::Switch)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

/// Scene-object attribute that a lookup operator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Category,
    Location,
    ViewAngle,
    Object,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Category,
        Attribute::Location,
        Attribute::ViewAngle,
        Attribute::Object,
    ];

    /// The lookup operator for this attribute.
    pub fn lookup(&self) -> OpKind {
        match self {
            Attribute::Category => OpKind::GetCategory,
            Attribute::Location => OpKind::GetLoc,
            Attribute::ViewAngle => OpKind::GetViewAngle,
            Attribute::Object => OpKind::GetObject,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Category => "category",
            Attribute::Location => "location",
            Attribute::ViewAngle => "view_angle",
            Attribute::Object => "object",
        };
        f.write_str(name)
    }
}
