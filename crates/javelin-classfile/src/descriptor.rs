//! JVM type descriptor parsing.
//!
//! Descriptors are the compact signature strings of the class-file format:
//! `I` for int, `Ljava/lang/String;` for a class reference, `[D` for a
//! double array, `(II)I` for a method taking two ints and returning one.

use thiserror::Error;

/// A parsed JVM type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JavaType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Class reference, internal name in slash form.
    Object(String),
    Array(Box<JavaType>),
}

impl JavaType {
    /// Whether the type occupies a reference slot.
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }
}

/// A parsed method descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<JavaType>,
    /// `None` for `void`.
    pub ret: Option<JavaType>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor ended unexpectedly: {0:?}")]
    UnexpectedEnd(String),
    #[error("invalid descriptor tag {tag:?} at offset {offset} in {descriptor:?}")]
    InvalidTag {
        tag: char,
        offset: usize,
        descriptor: String,
    },
    #[error("method descriptor must start with '(': {0:?}")]
    MissingParams(String),
    #[error("trailing characters after descriptor: {0:?}")]
    Trailing(String),
}

/// Parse a field descriptor such as `I` or `[Ljava/lang/String;`.
pub fn parse_field_descriptor(descriptor: &str) -> Result<JavaType, DescriptorError> {
    let mut cursor = Cursor::new(descriptor);
    let ty = cursor.java_type()?;
    if cursor.pos < descriptor.len() {
        return Err(DescriptorError::Trailing(descriptor.to_string()));
    }
    Ok(ty)
}

/// Parse a method descriptor such as `(ILjava/lang/String;)V`.
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(descriptor);
    if cursor.bump() != Some('(') {
        return Err(DescriptorError::MissingParams(descriptor.to_string()));
    }

    let mut params = Vec::new();
    loop {
        match cursor.peek() {
            Some(')') => {
                cursor.bump();
                break;
            }
            Some(_) => params.push(cursor.java_type()?),
            None => return Err(DescriptorError::UnexpectedEnd(descriptor.to_string())),
        }
    }

    let ret = match cursor.peek() {
        Some('V') => {
            cursor.bump();
            None
        }
        Some(_) => Some(cursor.java_type()?),
        None => return Err(DescriptorError::UnexpectedEnd(descriptor.to_string())),
    };
    if cursor.pos < descriptor.len() {
        return Err(DescriptorError::Trailing(descriptor.to_string()));
    }

    Ok(MethodDescriptor { params, ret })
}

/// Char cursor over a descriptor string.
struct Cursor<'a> {
    descriptor: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(descriptor: &'a str) -> Self {
        Self { descriptor, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.descriptor[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn java_type(&mut self) -> Result<JavaType, DescriptorError> {
        let offset = self.pos;
        let tag = self
            .bump()
            .ok_or_else(|| DescriptorError::UnexpectedEnd(self.descriptor.to_string()))?;

        match tag {
            'Z' => Ok(JavaType::Boolean),
            'B' => Ok(JavaType::Byte),
            'C' => Ok(JavaType::Char),
            'S' => Ok(JavaType::Short),
            'I' => Ok(JavaType::Int),
            'J' => Ok(JavaType::Long),
            'F' => Ok(JavaType::Float),
            'D' => Ok(JavaType::Double),
            '[' => Ok(JavaType::Array(Box::new(self.java_type()?))),
            'L' => {
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(';') => break,
                        Some(_) => {}
                        None => {
                            return Err(DescriptorError::UnexpectedEnd(
                                self.descriptor.to_string(),
                            ));
                        }
                    }
                }
                let name = &self.descriptor[start..self.pos - 1];
                Ok(JavaType::Object(name.to_string()))
            }
            _ => Err(DescriptorError::InvalidTag {
                tag,
                offset,
                descriptor: self.descriptor.to_string(),
            }),
        }
    }
}
