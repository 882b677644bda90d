use crate::{Float, Integer};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::{Display, Formatter};

/// 流水线中流动的动态值。
///
/// `Nil`是合法的元素值（同时也是部分收集器对"无结果"的表示），
/// 与迭代器协议的耗尽信号（`Option::None`）无关。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(Integer),
    Float(Float),
    Str(String),
    List(Vec<Value>),
    Map(FxHashMap<String, Value>),
}

impl Value {
    /// 真值判定：`Nil`、`false`、`0`、`0.0`、空字符串、空列表、空映射为假，
    /// 其余为真。
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// 值的种类名称，用于错误信息。
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// 数值视图，非数值返回`None`。
    pub(crate) fn as_num(&self) -> Option<Num> {
        match self {
            Value::Int(i) => Some(Num::Integer(*i)),
            Value::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    /// 去重用的规范化键。
    ///
    /// 小数部分为零的浮点数归一化为整数键，保证`1`与`1.0`按同一元素去重。
    pub(crate) fn key(&self) -> Key {
        match self {
            Value::Nil => Key::Nil,
            Value::Bool(b) => Key::Bool(*b),
            Value::Int(i) => Key::Int(*i),
            Value::Float(f) => {
                if f.fract() == 0.0 && *f >= Integer::MIN as Float && *f <= Integer::MAX as Float {
                    Key::Int(*f as Integer)
                } else {
                    Key::Float(OrderedFloat(*f))
                }
            }
            Value::Str(s) => Key::Str(s.clone()),
            Value::List(items) => Key::List(items.iter().map(Value::key).collect()),
            Value::Map(map) => {
                let mut entries: Vec<(String, Key)> = map.iter().map(|(k, v)| (k.clone(), v.key())).collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                Key::Map(entries)
            }
        }
    }

    /// 全序比较：先按种类排序（Nil < Bool < 数值 < Str < List < Map），
    /// 同种类内部比较，整数与浮点数跨类型按数值比较。
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return a.cmp_num(b);
        }
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => {
                let mut left: Vec<(&String, &Value)> = a.iter().collect();
                let mut right: Vec<(&String, &Value)> = b.iter().collect();
                left.sort_by(|(x, _), (y, _)| x.cmp(y));
                right.sort_by(|(x, _), (y, _)| x.cmp(y));
                for ((ka, va), (kb, vb)) in left.iter().zip(right.iter()) {
                    let ord = ka.cmp(kb).then_with(|| va.total_cmp(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                left.len().cmp(&right.len())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::List(_) => 4,
            Value::Map(_) => 5,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Map(map) => write!(f, "{{{}}}", map.iter().map(|(k, v)| format!("{}: {}", k, v)).join(", ")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Integer> for Value {
    fn from(i: Integer) -> Self {
        Value::Int(i)
    }
}

impl From<Float> for Value {
    fn from(f: Float) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(c.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// 数值：整数或浮点数，混合运算时提升为浮点数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Integer(Integer),
    Float(Float),
}

impl Num {
    pub(crate) fn add(self, other: Num) -> Num {
        match (self, other) {
            (Num::Integer(a), Num::Integer(b)) => Num::Integer(a + b),
            (a, b) => Num::Float(a.as_float() + b.as_float()),
        }
    }

    pub(crate) fn as_float(self) -> Float {
        match self {
            Num::Integer(i) => i as Float,
            Num::Float(f) => f,
        }
    }

    pub(crate) fn cmp_num(self, other: Num) -> Ordering {
        match (self, other) {
            (Num::Integer(a), Num::Integer(b)) => a.cmp(&b),
            (a, b) => OrderedFloat(a.as_float()).cmp(&OrderedFloat(b.as_float())),
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Num::Integer(i) => Value::Int(i),
            Num::Float(f) => Value::Float(f),
        }
    }
}

/// 可哈希的规范化键，浮点数经`OrderedFloat`包装后参与哈希。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Key {
    Nil,
    Bool(bool),
    Int(Integer),
    Float(OrderedFloat<Float>),
    Str(String),
    List(Vec<Key>),
    Map(Vec<(String, Key)>),
}
