// ./src/encoding/registry.rs

use super::{
    ArrayEncoder, ClassContract, DateTimeEncoder, Encoder, EncodingContext, ObjectEncoder,
    ScalarEncoder, WireValue,
};
use crate::error::EncodingError;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

const SCALAR_TYPES: [&str; 4] = ["bool", "float", "int", "string"];

/// Type names the default date-time encoder answers to.
pub const DATE_TIME_TYPES: [&str; 3] = ["DateTime", "DateTimeImmutable", "DateTimeInterface"];

/// Canonical registry key for a type name.
///
/// Strips a nullable `?` marker, folds scalar aliases (`boolean`, `double`,
/// `integer`) and maps every `X[]` to `array`.
pub fn normalize_type(ty: &str) -> String {
    let ty = ty.trim().trim_start_matches('?').trim_start_matches('\\');
    if ty.ends_with("[]") {
        return "array".to_owned();
    }
    match ty.to_ascii_lowercase().as_str() {
        "bool" | "boolean" => "bool".to_owned(),
        "float" | "double" => "float".to_owned(),
        "int" | "integer" => "int".to_owned(),
        "string" => "string".to_owned(),
        "array" => "array".to_owned(),
        _ => ty.to_owned(),
    }
}

// ════════════════════════════════════════════════════════════
// 1. The registry
// ════════════════════════════════════════════════════════════

/// Maps type names to encoders. Built once at startup and read-only afterwards;
/// share it behind an `Arc`.
pub struct EncoderRegistry {
    encoders: HashMap<String, Arc<dyn Encoder>>,
    contracts: HashMap<String, Arc<ClassContract>>,
    object_encoder: Arc<dyn Encoder>,
    scalar_encoder: Arc<dyn Encoder>,
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl EncoderRegistry {
    /// Starts an empty registry with the default object and scalar fallbacks.
    pub fn builder() -> EncoderRegistryBuilder {
        EncoderRegistryBuilder::new()
    }

    /// Registry with the scalar, array and date-time encoders registered.
    pub fn with_defaults() -> Self {
        Self::builder().with_default_encoders().build()
    }

    /// Resolves the encoder for a declared type name.
    ///
    /// Registered types win, then contracted classes (default object encoder),
    /// then scalar names (default scalar encoder). Anything else is unknown.
    pub fn encoder_for_type(&self, ty: &str) -> Result<&dyn Encoder, EncodingError> {
        let normalized = normalize_type(ty);
        if let Some(encoder) = self.encoders.get(&normalized) {
            return Ok(encoder.as_ref());
        }
        if self.contracts.contains_key(&normalized) {
            return Ok(self.object_encoder.as_ref());
        }
        if SCALAR_TYPES.contains(&normalized.as_str()) {
            return Ok(self.scalar_encoder.as_ref());
        }
        Err(EncodingError::UnknownType(ty.to_owned()))
    }

    /// Resolves the encoder for a value by its runtime type.
    pub fn encoder_for_value(&self, value: &Value) -> Result<&dyn Encoder, EncodingError> {
        match value {
            Value::Object(object) => Ok(self
                .encoders
                .get(&object.class())
                .map_or(self.object_encoder.as_ref(), |e| e.as_ref())),
            Value::Array(_) => self.encoder_for_type("array"),
            Value::DateTime(_) => self.encoder_for_type("DateTime"),
            scalar => Ok(self
                .encoders
                .get(&scalar.type_name())
                .map_or(self.scalar_encoder.as_ref(), |e| e.as_ref())),
        }
    }

    pub fn contract(&self, class: &str) -> Option<&ClassContract> {
        self.contracts.get(&normalize_type(class)).map(Arc::as_ref)
    }

    /// Whether values declared as `ty` can be decoded.
    pub fn supports_type(&self, ty: &str) -> bool {
        self.encoder_for_type(ty).is_ok()
    }

    /// Whether values of runtime type `ty` can be encoded.
    ///
    /// Unlike decoding this needs no contract: any class without a dedicated
    /// encoder is written by the default object encoder.
    pub fn supports_writing(&self, ty: &str) -> bool {
        let normalized = normalize_type(ty);
        match normalized.as_str() {
            "" => false,
            "array" => self.encoders.contains_key("array"),
            _ => true,
        }
    }

    /// Encodes a whole value tree with a fresh context.
    pub fn encode(&self, value: &Value) -> Result<WireValue, EncodingError> {
        let mut cx = EncodingContext::new(self);
        self.encoder_for_value(value)?.encode(value, &mut cx)
    }

    /// Decodes a whole wire tree into `ty` with a fresh context.
    pub fn decode(&self, wire: &WireValue, ty: &str) -> Result<Value, EncodingError> {
        let mut cx = EncodingContext::new(self);
        self.encoder_for_type(ty)?.decode(wire, ty, &mut cx)
    }
}

// ════════════════════════════════════════════════════════════
// 2. Builder
// ════════════════════════════════════════════════════════════

pub struct EncoderRegistryBuilder {
    encoders: HashMap<String, Arc<dyn Encoder>>,
    contracts: HashMap<String, Arc<ClassContract>>,
    object_encoder: Arc<dyn Encoder>,
    scalar_encoder: Arc<dyn Encoder>,
}

impl Default for EncoderRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderRegistryBuilder {
    pub fn new() -> Self {
        Self {
            encoders: HashMap::new(),
            contracts: HashMap::new(),
            object_encoder: Arc::new(ObjectEncoder::new()),
            scalar_encoder: Arc::new(ScalarEncoder),
        }
    }

    /// Registers the scalar, array and ISO-8601 date-time encoders.
    pub fn with_default_encoders(self) -> Self {
        let scalar = Arc::clone(&self.scalar_encoder);
        self.shared_encoder(&SCALAR_TYPES, scalar)
            .encoder(&["array"], ArrayEncoder)
            .encoder(&DATE_TIME_TYPES, DateTimeEncoder::default())
    }

    /// Registers `encoder` for every type in `types`.
    pub fn encoder<E: Encoder + 'static>(self, types: &[&str], encoder: E) -> Self {
        self.shared_encoder(types, Arc::new(encoder))
    }

    pub fn shared_encoder(mut self, types: &[&str], encoder: Arc<dyn Encoder>) -> Self {
        for ty in types {
            self.encoders.insert(normalize_type(ty), Arc::clone(&encoder));
        }
        self
    }

    /// Replaces the encoder used for classes without a dedicated encoder.
    pub fn object_encoder<E: Encoder + 'static>(mut self, encoder: E) -> Self {
        self.object_encoder = Arc::new(encoder);
        self
    }

    pub fn scalar_encoder<E: Encoder + 'static>(mut self, encoder: E) -> Self {
        self.scalar_encoder = Arc::new(encoder);
        self
    }

    /// Describes a class so the object encoder can decode into it.
    pub fn contract(mut self, contract: ClassContract) -> Self {
        self.contracts
            .insert(normalize_type(contract.class()), Arc::new(contract));
        self
    }

    pub fn build(self) -> EncoderRegistry {
        tracing::debug!(
            encoders = self.encoders.len(),
            contracts = self.contracts.len(),
            "encoder registry built"
        );
        EncoderRegistry {
            encoders: self.encoders,
            contracts: self.contracts,
            object_encoder: self.object_encoder,
            scalar_encoder: self.scalar_encoder,
        }
    }
}
