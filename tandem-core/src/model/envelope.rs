use crate::model::participant::{ParticipantId, ParticipantIdError};
use crate::model::signaling::SignalMessage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum RawSignalError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Sender(#[from] ParticipantIdError),
}

/// Сообщение в том виде, в каком его видит сервер: произвольный JSON-объект.
/// Неизвестные типы пересылаются как есть.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSignal(Map<String, Value>);

impl RawSignal {
    pub fn parse(text: &str) -> Result<Self, RawSignalError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(RawSignalError::NotAnObject),
        }
    }

    pub fn from_signal(msg: &SignalMessage) -> Result<Self, RawSignalError> {
        match serde_json::to_value(msg)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(RawSignalError::NotAnObject),
        }
    }

    /// `bye` synthesized by the relay when a participant disconnects.
    pub fn bye(from: ParticipantId) -> Self {
        let mut map = Map::new();
        map.insert("type".into(), Value::from("bye"));
        map.insert("from".into(), Value::from(from.to_string()));
        Self(map)
    }

    pub fn error(message: &str) -> Self {
        let mut map = Map::new();
        map.insert("type".into(), Value::from("error"));
        map.insert("message".into(), Value::from(message));
        Self(map)
    }

    pub fn message_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn enabled(&self) -> Option<bool> {
        self.0.get("enabled").and_then(Value::as_bool)
    }

    pub fn from_id(&self) -> Option<&str> {
        self.0.get("from").and_then(Value::as_str)
    }

    /// Перезаписывает `from` идентификатором отправителя, что бы ни прислал клиент.
    pub fn stamp_from(&mut self, sender: ParticipantId) {
        self.0.insert("from".into(), Value::from(sender.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Входящее сообщение на стороне клиента: отправитель + типизированное тело.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub from: Option<ParticipantId>,
    pub signal: SignalMessage,
}

impl Envelope {
    pub fn new(from: Option<ParticipantId>, signal: SignalMessage) -> Self {
        Self { from, signal }
    }

    pub fn parse(text: &str) -> Result<Self, RawSignalError> {
        let raw = RawSignal::parse(text)?;
        raw.try_into()
    }
}

impl TryFrom<RawSignal> for Envelope {
    type Error = RawSignalError;

    fn try_from(raw: RawSignal) -> Result<Self, Self::Error> {
        let from = raw.from_id().map(str::parse::<ParticipantId>).transpose()?;
        let signal = SignalMessage::deserialize(Value::Object(raw.0))?;
        Ok(Self { from, signal })
    }
}
