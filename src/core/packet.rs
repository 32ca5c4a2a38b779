use super::Timestamp;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Concrete Rust type carried by a payload or accepted by a port
#[derive(Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Immutable, type-erased value. Used for packet contents, stream headers
/// and side packets. Cloning shares the underlying value.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    value_type: ValueType,
}

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            value_type: ValueType::of::<T>(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// True when both payloads share the same allocation.
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload<{}>", self.value_type)
    }
}

/// A payload stamped with the logical time it belongs to
#[derive(Debug, Clone)]
pub struct Packet {
    payload: Payload,
    timestamp: Timestamp,
}

impl Packet {
    pub fn new<T: Any + Send + Sync>(value: T, timestamp: Timestamp) -> Self {
        Self {
            payload: Payload::new(value),
            timestamp,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn value_type(&self) -> ValueType {
        self.payload.value_type()
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.payload.get::<T>()
    }

    /// Same value restamped at `timestamp`.
    pub fn at(&self, timestamp: Timestamp) -> Self {
        Self {
            payload: self.payload.clone(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_downcast() {
        let payload = Payload::new(vec![1u8, 2, 3]);
        assert_eq!(payload.get::<Vec<u8>>(), Some(&vec![1, 2, 3]));
        assert!(payload.get::<String>().is_none());
        assert_eq!(payload.value_type(), ValueType::of::<Vec<u8>>());
    }

    #[test]
    fn test_restamp_shares_value() {
        let packet = Packet::new("frame".to_string(), Timestamp::new(3));
        let moved = packet.at(Timestamp::new(7));

        assert_eq!(moved.timestamp(), Timestamp::new(7));
        assert!(moved.payload().ptr_eq(packet.payload()));
    }
}
