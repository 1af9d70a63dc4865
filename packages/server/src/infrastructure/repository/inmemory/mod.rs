//! InMemory 実装
//!
//! Presence / Room はプロセス内の状態そのもの。
//! 会話ストアは外部ストアの代替で、単一プロセスでサーバーを動かすために使う。

pub mod conversation;
pub mod presence;
pub mod room;

pub use conversation::InMemoryConversationStore;
pub use presence::InMemoryPresenceRepository;
pub use room::InMemoryRoomRepository;
