use crate::{NbtError, NbtResult};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// NBT tag type IDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NbtType {
    #[default]
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
}

impl NbtType {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => NbtType::End,
            1 => NbtType::Byte,
            2 => NbtType::Short,
            3 => NbtType::Int,
            4 => NbtType::Long,
            5 => NbtType::Float,
            6 => NbtType::Double,
            7 => NbtType::ByteArray,
            8 => NbtType::String,
            9 => NbtType::List,
            10 => NbtType::Compound,
            11 => NbtType::IntArray,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            NbtType::End => "TAG_End",
            NbtType::Byte => "TAG_Byte",
            NbtType::Short => "TAG_Short",
            NbtType::Int => "TAG_Int",
            NbtType::Long => "TAG_Long",
            NbtType::Float => "TAG_Float",
            NbtType::Double => "TAG_Double",
            NbtType::ByteArray => "TAG_Byte_Array",
            NbtType::String => "TAG_String",
            NbtType::List => "TAG_List",
            NbtType::Compound => "TAG_Compound",
            NbtType::IntArray => "TAG_Int_Array",
        }
    }
}

impl TryFrom<u8> for NbtType {
    type Error = NbtError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        NbtType::from_id(id).ok_or(NbtError::UnknownTagType(id))
    }
}

impl fmt::Display for NbtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An NBT value. There is no `End` variant: End only exists on the wire.
///
/// Equality and hashing are structural; floats compare by bit pattern so that
/// `Eq` and `Hash` agree.
#[derive(Debug, Clone)]
pub enum NbtValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(NbtList),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
}

impl NbtValue {
    pub fn tag_type(&self) -> NbtType {
        match self {
            NbtValue::Byte(_) => NbtType::Byte,
            NbtValue::Short(_) => NbtType::Short,
            NbtValue::Int(_) => NbtType::Int,
            NbtValue::Long(_) => NbtType::Long,
            NbtValue::Float(_) => NbtType::Float,
            NbtValue::Double(_) => NbtType::Double,
            NbtValue::ByteArray(_) => NbtType::ByteArray,
            NbtValue::String(_) => NbtType::String,
            NbtValue::List(_) => NbtType::List,
            NbtValue::Compound(_) => NbtType::Compound,
            NbtValue::IntArray(_) => NbtType::IntArray,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            NbtValue::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_byte().map(|v| v != 0)
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            NbtValue::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            NbtValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            NbtValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            NbtValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NbtValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_byte_array(&self) -> Option<&[i8]> {
        match self {
            NbtValue::ByteArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        match self {
            NbtValue::IntArray(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&NbtList> {
        match self {
            NbtValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut NbtList> {
        match self {
            NbtValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtValue::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut NbtCompound> {
        match self {
            NbtValue::Compound(v) => Some(v),
            _ => None,
        }
    }
}

impl PartialEq for NbtValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NbtValue::Byte(a), NbtValue::Byte(b)) => a == b,
            (NbtValue::Short(a), NbtValue::Short(b)) => a == b,
            (NbtValue::Int(a), NbtValue::Int(b)) => a == b,
            (NbtValue::Long(a), NbtValue::Long(b)) => a == b,
            (NbtValue::Float(a), NbtValue::Float(b)) => a.to_bits() == b.to_bits(),
            (NbtValue::Double(a), NbtValue::Double(b)) => a.to_bits() == b.to_bits(),
            (NbtValue::ByteArray(a), NbtValue::ByteArray(b)) => a == b,
            (NbtValue::String(a), NbtValue::String(b)) => a == b,
            (NbtValue::List(a), NbtValue::List(b)) => a == b,
            (NbtValue::Compound(a), NbtValue::Compound(b)) => a == b,
            (NbtValue::IntArray(a), NbtValue::IntArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for NbtValue {}

impl Hash for NbtValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag_type().hash(state);
        match self {
            NbtValue::Byte(v) => v.hash(state),
            NbtValue::Short(v) => v.hash(state),
            NbtValue::Int(v) => v.hash(state),
            NbtValue::Long(v) => v.hash(state),
            NbtValue::Float(v) => v.to_bits().hash(state),
            NbtValue::Double(v) => v.to_bits().hash(state),
            NbtValue::ByteArray(v) => v.hash(state),
            NbtValue::String(v) => v.hash(state),
            NbtValue::List(v) => v.hash(state),
            NbtValue::Compound(v) => v.hash(state),
            NbtValue::IntArray(v) => v.hash(state),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for NbtValue {
                fn from(v: $ty) -> Self {
                    NbtValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Vec<i8> => ByteArray,
    String => String,
    NbtList => List,
    NbtCompound => Compound,
    Vec<i32> => IntArray,
}

impl From<bool> for NbtValue {
    fn from(v: bool) -> Self {
        NbtValue::Byte(v as i8)
    }
}

impl From<&str> for NbtValue {
    fn from(v: &str) -> Self {
        NbtValue::String(v.to_owned())
    }
}

/// An ordered list of values sharing one element type.
///
/// A list typed [`NbtType::End`] is unconstrained: the first insertion fixes its
/// element type. Every later insertion must match it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NbtList {
    element_type: NbtType,
    items: Vec<NbtValue>,
}

impl NbtList {
    /// An empty, unconstrained list.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty list that only accepts `element_type`.
    pub fn with_type(element_type: NbtType) -> Self {
        Self {
            element_type,
            items: Vec::new(),
        }
    }

    /// Build a list, validating that every value has the same type.
    pub fn from_values(values: Vec<NbtValue>) -> NbtResult<Self> {
        let mut list = Self::new();
        for value in values {
            list.push(value)?;
        }
        Ok(list)
    }

    /// Used by the decoder, which has already checked every payload's type.
    pub(crate) fn from_parts(element_type: NbtType, items: Vec<NbtValue>) -> Self {
        Self {
            element_type,
            items,
        }
    }

    pub fn element_type(&self) -> NbtType {
        self.element_type
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NbtValue> {
        self.items.get(index)
    }

    /// Mutable access to a compound element; cannot change the element type.
    pub fn compound_mut(&mut self, index: usize) -> Option<&mut NbtCompound> {
        self.items.get_mut(index).and_then(NbtValue::as_compound_mut)
    }

    /// Mutable access to a nested list element; cannot change the element type.
    pub fn list_mut(&mut self, index: usize) -> Option<&mut NbtList> {
        self.items.get_mut(index).and_then(NbtValue::as_list_mut)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NbtValue> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[NbtValue] {
        &self.items
    }

    pub fn into_values(self) -> Vec<NbtValue> {
        self.items
    }

    fn accept(&mut self, found: NbtType) -> NbtResult<()> {
        if self.element_type == NbtType::End {
            self.element_type = found;
        } else if self.element_type != found {
            return Err(NbtError::TypeMismatch {
                expected: self.element_type,
                found,
            });
        }
        Ok(())
    }

    pub fn push(&mut self, value: impl Into<NbtValue>) -> NbtResult<()> {
        let value = value.into();
        self.accept(value.tag_type())?;
        self.items.push(value);
        Ok(())
    }

    pub fn insert(&mut self, index: usize, value: impl Into<NbtValue>) -> NbtResult<()> {
        if index > self.items.len() {
            return Err(NbtError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let value = value.into();
        self.accept(value.tag_type())?;
        self.items.insert(index, value);
        Ok(())
    }

    /// Replace the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: impl Into<NbtValue>) -> NbtResult<NbtValue> {
        if index >= self.items.len() {
            return Err(NbtError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let value = value.into();
        self.accept(value.tag_type())?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    pub fn extend<I, V>(&mut self, values: I) -> NbtResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<NbtValue>,
    {
        for value in values {
            self.push(value)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<NbtValue> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Remove all elements. The element type stays fixed.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push_byte(&mut self, value: i8) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_bool(&mut self, value: bool) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_short(&mut self, value: i16) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_int(&mut self, value: i32) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_long(&mut self, value: i64) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_float(&mut self, value: f32) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_double(&mut self, value: f64) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_string(&mut self, value: impl Into<String>) -> NbtResult<()> {
        self.push(value.into())
    }

    pub fn push_byte_array(&mut self, value: Vec<i8>) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_int_array(&mut self, value: Vec<i32>) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_compound(&mut self, value: NbtCompound) -> NbtResult<()> {
        self.push(value)
    }

    pub fn push_list(&mut self, value: NbtList) -> NbtResult<()> {
        self.push(value)
    }
}

impl<'a> IntoIterator for &'a NbtList {
    type Item = &'a NbtValue;
    type IntoIter = std::slice::Iter<'a, NbtValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for NbtList {
    type Item = NbtValue;
    type IntoIter = std::vec::IntoIter<NbtValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A string-keyed map of values. Iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NbtCompound {
    entries: BTreeMap<String, NbtValue>,
}

impl NbtCompound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite an entry, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<NbtValue>,
    ) -> Option<NbtValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<NbtValue> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, key: &str) -> Option<&NbtValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut NbtValue> {
        self.entries.get_mut(key)
    }

    pub fn get_byte(&self, key: &str) -> Option<i8> {
        self.get(key).and_then(NbtValue::as_byte)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(NbtValue::as_bool)
    }

    pub fn get_short(&self, key: &str) -> Option<i16> {
        self.get(key).and_then(NbtValue::as_short)
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get(key).and_then(NbtValue::as_int)
    }

    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(NbtValue::as_long)
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(NbtValue::as_float)
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(NbtValue::as_double)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(NbtValue::as_str)
    }

    pub fn get_byte_array(&self, key: &str) -> Option<&[i8]> {
        self.get(key).and_then(NbtValue::as_byte_array)
    }

    pub fn get_int_array(&self, key: &str) -> Option<&[i32]> {
        self.get(key).and_then(NbtValue::as_int_array)
    }

    pub fn get_list(&self, key: &str) -> Option<&NbtList> {
        self.get(key).and_then(NbtValue::as_list)
    }

    pub fn get_list_mut(&mut self, key: &str) -> Option<&mut NbtList> {
        self.get_mut(key).and_then(NbtValue::as_list_mut)
    }

    pub fn get_compound(&self, key: &str) -> Option<&NbtCompound> {
        self.get(key).and_then(NbtValue::as_compound)
    }

    pub fn get_compound_mut(&mut self, key: &str) -> Option<&mut NbtCompound> {
        self.get_mut(key).and_then(NbtValue::as_compound_mut)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, NbtValue> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a NbtCompound {
    type Item = (&'a String, &'a NbtValue);
    type IntoIter = btree_map::Iter<'a, String, NbtValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for NbtCompound {
    type Item = (String, NbtValue);
    type IntoIter = btree_map::IntoIter<String, NbtValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, NbtValue)> for NbtCompound {
    fn from_iter<I: IntoIterator<Item = (String, NbtValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A tag with a name, as found at the root of an NBT document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NamedTag {
    pub name: String,
    pub value: NbtValue,
}

impl NamedTag {
    pub fn new(name: impl Into<String>, value: impl Into<NbtValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn tag_type(&self) -> NbtType {
        self.value.tag_type()
    }

    /// The root compound, or an error naming the actual root type.
    pub fn into_compound(self) -> NbtResult<NbtCompound> {
        match self.value {
            NbtValue::Compound(c) => Ok(c),
            other => Err(NbtError::UnexpectedRootType(other.tag_type())),
        }
    }
}

impl Default for NbtValue {
    fn default() -> Self {
        NbtValue::Compound(NbtCompound::new())
    }
}

// === Display (SNBT-like) ===

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

impl fmt::Display for NbtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NbtValue::Byte(v) => write!(f, "{}b", v),
            NbtValue::Short(v) => write!(f, "{}s", v),
            NbtValue::Int(v) => write!(f, "{}", v),
            NbtValue::Long(v) => write!(f, "{}L", v),
            NbtValue::Float(v) => write!(f, "{:?}f", v),
            NbtValue::Double(v) => write!(f, "{:?}d", v),
            NbtValue::String(v) => write_quoted(f, v),
            NbtValue::ByteArray(v) => {
                f.write_str("[B;")?;
                for (i, b) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}b", b)?;
                }
                f.write_str("]")
            }
            NbtValue::IntArray(v) => {
                f.write_str("[I;")?;
                for (i, n) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", n)?;
                }
                f.write_str("]")
            }
            NbtValue::List(list) => list.fmt(f),
            NbtValue::Compound(compound) => compound.fmt(f),
        }
    }
}

impl fmt::Display for NbtList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", item)?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for NbtCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if is_bare_key(key) {
                f.write_str(key)?;
            } else {
                write_quoted(f, key)?;
            }
            write!(f, ":{}", value)?;
        }
        f.write_str("}")
    }
}

/// Helper macro for building compound tags.
#[macro_export]
macro_rules! nbt_compound {
    ($($key:expr => $val:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut compound = $crate::NbtCompound::new();
        $(compound.insert($key, $val);)*
        compound
    }};
}

/// Helper macro for building list tags. Evaluates to `NbtResult<NbtList>`.
#[macro_export]
macro_rules! nbt_list {
    ($($val:expr),* $(,)?) => {
        $crate::NbtList::from_values(vec![$($crate::NbtValue::from($val)),*])
    };
}
