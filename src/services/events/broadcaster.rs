/*!
 * 考勤事件广播器
 *
 * 按学校维护 `tokio::sync::broadcast` 通道，webhook 入库成功后把事件
 * 推送给该校的所有 SSE 订阅者；超级管理员订阅跨校通道。
 * 连接计数按学校记录，仪表盘用它展示实时在线连接数。
 */

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// 单个通道的缓冲容量，慢消费者超出后收到 Lagged 并跳帧
const CHANNEL_CAPACITY: usize = 256;

/// 全局广播器实例
static EVENT_BROADCASTER: Lazy<EventBroadcaster> = Lazy::new(EventBroadcaster::new);

/// 推送给前端的考勤事件载荷
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceEventMessage {
    pub school_id: i64,
    pub student_id: i64,
    pub full_name: String,
    /// in / out
    pub event_type: String,
    pub status: String,
    pub late_minutes: i64,
    pub currently_in_school: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

pub struct EventBroadcaster {
    /// 学校 ID -> 该校事件通道
    channels: DashMap<i64, broadcast::Sender<AttendanceEventMessage>>,
    /// 跨校通道（超级管理员流）
    admin_channel: broadcast::Sender<AttendanceEventMessage>,
    /// 学校 ID -> 当前 SSE 连接数
    connections: DashMap<i64, usize>,
}

impl EventBroadcaster {
    fn new() -> Self {
        let (admin_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            channels: DashMap::new(),
            admin_channel: admin_tx,
            connections: DashMap::new(),
        }
    }

    /// 获取全局实例
    pub fn get() -> &'static Self {
        &EVENT_BROADCASTER
    }

    /// 订阅某学校的事件流
    pub fn subscribe(&self, school_id: i64) -> broadcast::Receiver<AttendanceEventMessage> {
        self.channels
            .entry(school_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// 订阅跨校事件流
    pub fn subscribe_admin(&self) -> broadcast::Receiver<AttendanceEventMessage> {
        self.admin_channel.subscribe()
    }

    /// 广播一条考勤事件（本校通道 + 跨校通道）
    pub fn emit(&self, message: AttendanceEventMessage) {
        if let Some(tx) = self.channels.get(&message.school_id) {
            // 没有订阅者时 send 返回 Err，属正常情况
            let _ = tx.send(message.clone());
        }
        let _ = self.admin_channel.send(message);
    }

    /// 登记一条新连接，返回在 Drop 时自动注销的守卫
    pub fn register_connection(&self, school_id: i64) -> ConnectionGuard {
        let mut entry = self.connections.entry(school_id).or_insert(0);
        *entry += 1;
        debug!("SSE connection opened for school {} (now {})", school_id, *entry);
        ConnectionGuard { school_id }
    }

    /// 某学校当前的 SSE 连接数
    pub fn live_connections(&self, school_id: i64) -> usize {
        self.connections.get(&school_id).map(|c| *c).unwrap_or(0)
    }

    fn connection_closed(&self, school_id: i64) {
        if let Some(mut entry) = self.connections.get_mut(&school_id) {
            *entry = entry.saturating_sub(1);
            debug!("SSE connection closed for school {} (now {})", school_id, *entry);
        }
    }
}

/// SSE 连接守卫，流结束（客户端断开）时自动递减计数
pub struct ConnectionGuard {
    school_id: i64,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        EventBroadcaster::get().connection_closed(self.school_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(school_id: i64) -> AttendanceEventMessage {
        AttendanceEventMessage {
            school_id,
            student_id: 1,
            full_name: "Test Student".to_string(),
            event_type: "in".to_string(),
            status: "present".to_string(),
            late_minutes: 0,
            currently_in_school: true,
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_school_and_admin_subscribers() {
        let broadcaster = EventBroadcaster::new();
        let mut school_rx = broadcaster.subscribe(1);
        let mut admin_rx = broadcaster.subscribe_admin();

        broadcaster.emit(message(1));

        assert_eq!(school_rx.recv().await.unwrap().school_id, 1);
        assert_eq!(admin_rx.recv().await.unwrap().school_id, 1);
    }

    #[tokio::test]
    async fn test_emit_does_not_cross_schools() {
        let broadcaster = EventBroadcaster::new();
        let mut other_rx = broadcaster.subscribe(2);

        broadcaster.emit(message(1));

        assert!(matches!(
            other_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_connection_count_tracks_guard_lifetime() {
        let broadcaster = EventBroadcaster::get();
        assert_eq!(broadcaster.live_connections(99), 0);
        let guard = broadcaster.register_connection(99);
        assert_eq!(broadcaster.live_connections(99), 1);
        drop(guard);
        assert_eq!(broadcaster.live_connections(99), 0);
    }
}
