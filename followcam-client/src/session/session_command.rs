use crate::capture::TrackSet;
use followcam_core::{Role, StreamId};

/// Команды от приложения к сессии.
#[derive(Debug)]
pub enum SessionCommand {
    /// Подключиться к релею под streamId в роли role.
    /// Предыдущее соединение закрывается без переподключения.
    Open { stream_id: StreamId, role: Role },

    /// Закрыть все соединения и отменить переподключение.
    Close,

    /// Передать захваченные треки отправителя.
    AttachMedia(TrackSet),

    /// Закрыть все и завершить цикл сессии.
    Shutdown,
}
