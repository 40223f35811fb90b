use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// 一次只允許一個進行中的請求；新請求會取消舊請求
#[derive(Debug, Default)]
pub struct SingleFlight {
    next_id: AtomicU64,
    current: Mutex<Option<FlightTicket>>,
}

#[derive(Debug, Clone)]
pub struct FlightTicket {
    id: u64,
    token: CancellationToken,
}

impl FlightTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開始新的請求並取消前一個
    pub fn begin(&self) -> FlightTicket {
        let ticket = FlightTicket {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            token: CancellationToken::new(),
        };

        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = current.replace(ticket.clone()) {
            tracing::debug!("Cancelling superseded request #{}", previous.id);
            previous.token.cancel();
        }
        ticket
    }

    pub fn is_current(&self, ticket: &FlightTicket) -> bool {
        let current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.as_ref().map(|t| t.id) == Some(ticket.id) && !ticket.is_cancelled()
    }

    /// 執行請求；被取消或完成時已非最新請求，結果一律丟棄並回傳 `None`
    pub async fn run<F, T>(&self, ticket: &FlightTicket, future: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let output = tokio::select! {
            _ = ticket.token.cancelled() => None,
            output = future => Some(output),
        };

        match output {
            Some(output) if self.is_current(ticket) => Some(output),
            _ => {
                tracing::debug!("Discarding response of stale request #{}", ticket.id);
                None
            }
        }
    }
}
