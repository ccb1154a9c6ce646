/// Порт сигнального сервера по умолчанию.
pub const DEFAULT_PORT: u16 = 3000;

/// Единственный origin браузера, которому разрешен доступ к серверу по умолчанию.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Заголовок ответа на WS upgrade, в котором сервер сообщает клиенту его id.
/// Читается только нативными клиентами: браузер доступа к нему не дает.
pub const PARTICIPANT_ID_HEADER: &str = "x-participant-id";

/// Generic reply to a frame the relay could not handle.
pub const GENERIC_FAILURE_MESSAGE: &str = "Internal Server Error";
