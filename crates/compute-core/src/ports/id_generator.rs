//! IdempotencyTokenGenerator port - クラスタ作成用トークンの生成
//!
//! リモート側が既に見たトークン付きの作成リクエストは、新しいクラスタを
//! 起動せず既存のクラスタを返します。論理的な作成 1 回につき新しい
//! トークンが 1 つ必要です。
//!
//! # 実装
//! - **UlidTokenGenerator**: ULID ベース（Clock から timestamp を取得）

use ulid::Ulid;

use crate::domain::ids::IdempotencyToken;
use crate::ports::Clock;

/// Generates idempotency tokens.
///
/// `Send + Sync` so one generator can be shared by concurrent callers.
pub trait IdempotencyTokenGenerator: Send + Sync {
    fn generate(&self) -> IdempotencyToken;
}

/// ULID-based generator: timestamp from the clock, the rest random.
///
/// With a [`FixedClock`](crate::ports::FixedClock) the timestamp part is
/// deterministic while tokens stay unique.
pub struct UlidTokenGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidTokenGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdempotencyTokenGenerator for UlidTokenGenerator<C> {
    fn generate(&self) -> IdempotencyToken {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        IdempotencyToken::from_ulid(ulid)
    }
}
