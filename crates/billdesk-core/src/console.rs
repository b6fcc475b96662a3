// ── Console abstraction ──
//
// The single entry point for frontends. Owns the backend client, the read
// cache, and one mutation tracker per write family. Reads go through the
// cache; writes are validated, tracked, and invalidate the reads they
// make stale.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use billdesk_api::BillingClient;

use crate::command::requests::{
    CallRequest, ConsumeDataRequest, GenerateUsersRequest, InternetRequest, PackagePrice,
    RegisterUserRequest, SmsRequest, TransactionRequest, UpdateBalanceRequest,
};
use crate::command::{Command, CommandResult, MutationKind};
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::model::{CallDuration, Msisdn, PackageClass, Subscriber, TransactionRecord};
use crate::query::{MutationStatus, MutationTracker, QueryClient, QueryKey, QueryStatus};
use crate::session::{CallSession, CallSummary, check_call_balance};
use crate::stats::{DashboardStats, Page, paginate};

// ── Console ──────────────────────────────────────────────────────────

/// Cheaply cloneable via `Arc<ConsoleInner>`.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    client: BillingClient,
    queries: QueryClient,
    mutations: DashMap<MutationKind, Arc<MutationTracker>>,
}

impl Console {
    /// Build a console from configuration. No request is made until the
    /// first read or write.
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let client = BillingClient::new(config.server.as_str(), &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Use an already-built client (shared HTTP pool, tests).
    pub fn with_client(config: ConsoleConfig, client: BillingClient) -> Self {
        debug!(base = %client.base_url(), "console ready");
        let queries = QueryClient::new(config.stale_time);
        Self {
            inner: Arc::new(ConsoleInner {
                config,
                client,
                queries,
                mutations: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn queries(&self) -> &QueryClient {
        &self.inner.queries
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn all_users(&self) -> Result<Arc<Vec<Subscriber>>, CoreError> {
        let client = self.inner.client.clone();
        self.inner
            .queries
            .users()
            .fetch(QueryKey::AllUsers, move || async move {
                let users = client.list_users().await?;
                Ok::<_, CoreError>(users.into_iter().map(Subscriber::from).collect())
            })
            .await
    }

    /// Detail read for the selected subscriber. `None` disables the read:
    /// the status stays `Idle` and nothing is requested.
    pub async fn user_detail(&self, msisdn: Option<&Msisdn>) -> QueryStatus<Subscriber> {
        let Some(msisdn) = msisdn else {
            return QueryStatus::Idle;
        };
        let client = self.inner.client.clone();
        let target = msisdn.clone();
        self.inner
            .queries
            .user_detail()
            .query(QueryKey::UserDetail(msisdn.clone()), true, move || async move {
                client
                    .get_user(target.as_str())
                    .await
                    .map(Subscriber::from)
                    .map_err(|e| subscriber_error(e, &target))
            })
            .await
    }

    /// Detail read that must produce a subscriber.
    pub async fn subscriber(&self, msisdn: &Msisdn) -> Result<Arc<Subscriber>, CoreError> {
        match self.user_detail(Some(msisdn)).await.into_result()? {
            Some(sub) => Ok(sub),
            None => Err(CoreError::Internal(format!(
                "detail read for {msisdn} finished without a result"
            ))),
        }
    }

    pub async fn call_duration(&self, msisdn: &Msisdn) -> Result<Arc<CallDuration>, CoreError> {
        let client = self.inner.client.clone();
        let target = msisdn.clone();
        self.inner
            .queries
            .call_duration()
            .fetch(QueryKey::CallDuration(msisdn.clone()), move || async move {
                let raw = client.call_duration(target.as_str()).await?;
                Ok::<_, CoreError>(CallDuration::from(raw))
            })
            .await
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Validate, send, and track a command; invalidate its read keys on
    /// success. A validation failure sends nothing.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let kind = cmd.kind();
        let tracker = self.tracker(kind);

        if let Err(e) = cmd.validate() {
            debug!(%kind, error = %e, "rejected before sending");
            tracker.reject(&e);
            return Err(e);
        }

        let stale = cmd.invalidates();
        let result = tracker
            .run(route_command(&self.inner.client, cmd))
            .await?;

        self.inner.queries.invalidate_all(&stale);
        info!(%kind, invalidated = stale.len(), "mutation succeeded");
        Ok(result)
    }

    pub async fn register_user(
        &self,
        req: RegisterUserRequest,
    ) -> Result<Option<Subscriber>, CoreError> {
        expect_subscriber(self.execute(Command::RegisterUser(req)).await?)
    }

    pub async fn generate_users(&self, count: u32) -> Result<serde_json::Value, CoreError> {
        expect_ack(
            self.execute(Command::GenerateUsers(GenerateUsersRequest { count }))
                .await?,
        )
    }

    pub async fn update_balance(
        &self,
        req: UpdateBalanceRequest,
    ) -> Result<Option<Subscriber>, CoreError> {
        expect_subscriber(self.execute(Command::UpdateBalance(req)).await?)
    }

    pub async fn send_sms(&self, req: SmsRequest) -> Result<Option<TransactionRecord>, CoreError> {
        self.submit(TransactionRequest::Sms(req)).await
    }

    /// Voice call with a fixed duration. Live calls go through
    /// [`begin_call`](Self::begin_call) and [`settle_call`](Self::settle_call).
    pub async fn place_call(
        &self,
        req: CallRequest,
    ) -> Result<Option<TransactionRecord>, CoreError> {
        self.submit(TransactionRequest::Call(req)).await
    }

    pub async fn consume_internet(
        &self,
        req: InternetRequest,
    ) -> Result<Option<TransactionRecord>, CoreError> {
        self.submit(TransactionRequest::Internet(req)).await
    }

    pub async fn consume_data(
        &self,
        req: ConsumeDataRequest,
    ) -> Result<Option<TransactionRecord>, CoreError> {
        expect_transaction(self.execute(Command::ConsumeData(req)).await?)
    }

    pub async fn set_package_price(
        &self,
        req: PackagePrice,
    ) -> Result<serde_json::Value, CoreError> {
        expect_ack(self.execute(Command::SetPackagePrice(req)).await?)
    }

    pub async fn submit(
        &self,
        req: TransactionRequest,
    ) -> Result<Option<TransactionRecord>, CoreError> {
        expect_transaction(self.execute(Command::Transaction(req)).await?)
    }

    pub fn mutation_status(&self, kind: MutationKind) -> MutationStatus {
        self.tracker(kind).status()
    }

    pub fn watch_mutation(&self, kind: MutationKind) -> watch::Receiver<MutationStatus> {
        self.tracker(kind).subscribe()
    }

    fn tracker(&self, kind: MutationKind) -> Arc<MutationTracker> {
        Arc::clone(
            &self
                .inner
                .mutations
                .entry(kind)
                .or_insert_with(|| Arc::new(MutationTracker::new())),
        )
    }

    // ── Call sessions ────────────────────────────────────────────────

    /// Check the caller's balance and hand back an idle session.
    ///
    /// The gate runs once, here; the caller starts the returned session.
    pub async fn begin_call(&self, caller: Msisdn, callee: Msisdn) -> Result<CallSession, CoreError> {
        if caller == callee {
            return Err(CoreError::invalid("callee", "must differ from the caller"));
        }
        let subscriber = self.subscriber(&caller).await?;
        check_call_balance(&subscriber, self.inner.config.min_call_balance)?;
        debug!(%caller, %callee, balance = subscriber.balance, "balance gate passed");
        Ok(CallSession::new(caller, callee))
    }

    /// Bill an ended session as a voice call.
    ///
    /// A zero-second call is not billed and returns `Ok(None)`.
    pub async fn settle_call(
        &self,
        summary: &CallSummary,
    ) -> Result<Option<TransactionRecord>, CoreError> {
        if summary.elapsed_secs == 0 {
            debug!(caller = %summary.caller, "zero-length call, nothing to settle");
            return Ok(None);
        }

        let req = CallRequest {
            sender: summary.caller.clone(),
            receiver: summary.callee.clone(),
            duration_secs: summary.elapsed_secs,
        };
        self.place_call(req).await.inspect_err(|e| {
            warn!(
                caller = %summary.caller,
                elapsed = summary.elapsed_secs,
                error = %e,
                "call settlement failed"
            );
        })
    }

    // ── Views ────────────────────────────────────────────────────────

    pub async fn dashboard(&self) -> Result<DashboardStats, CoreError> {
        let users = self.all_users().await?;
        Ok(DashboardStats::from_subscribers(&users))
    }

    pub async fn page_of_users(
        &self,
        page: usize,
        page_size: usize,
    ) -> Result<Page<Subscriber>, CoreError> {
        let users = self.all_users().await?;
        Ok(paginate(&users, page, page_size))
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn shutdown(&self) {
        self.inner.queries.clear();
        self.inner.mutations.clear();
        info!("console shut down");
    }
}

// ── Command routing ──────────────────────────────────────────────────

async fn route_command(client: &BillingClient, cmd: Command) -> Result<CommandResult, CoreError> {
    match cmd {
        Command::RegisterUser(r) => {
            let user = client.register_user(&r.name, r.balance, &r.nin).await?;
            Ok(CommandResult::Subscriber(user.map(Subscriber::from)))
        }
        Command::GenerateUsers(r) => Ok(CommandResult::Ack(client.generate_users(r.count).await?)),
        Command::UpdateBalance(r) => {
            let user = client
                .update_user_balance(r.msisdn.as_str(), r.new_balance)
                .await
                .map_err(|e| subscriber_error(e, &r.msisdn))?;
            Ok(CommandResult::Subscriber(user.map(Subscriber::from)))
        }
        Command::Transaction(TransactionRequest::Sms(r)) => {
            let tx = client
                .send_sms(r.sender.as_str(), r.receiver.as_str(), &r.content)
                .await?;
            Ok(CommandResult::Transaction(tx.map(TransactionRecord::from)))
        }
        Command::Transaction(TransactionRequest::Call(r)) => {
            let tx = client
                .make_voice_call(r.sender.as_str(), r.receiver.as_str(), r.duration_secs)
                .await?;
            Ok(CommandResult::Transaction(tx.map(TransactionRecord::from)))
        }
        Command::Transaction(TransactionRequest::Internet(r)) => {
            let tx = client
                .consume_internet(r.consumer.as_str(), r.data_size_mb)
                .await?;
            Ok(CommandResult::Transaction(tx.map(TransactionRecord::from)))
        }
        Command::ConsumeData(r) => {
            let tx = client.consume_data(r.consumer.as_str()).await?;
            Ok(CommandResult::Transaction(tx.map(TransactionRecord::from)))
        }
        Command::SetPackagePrice(p) => {
            let ack = match p.class {
                PackageClass::Internet => client.set_internet_package(p.price).await?,
                PackageClass::Voice => client.set_voice_package(p.price).await?,
                PackageClass::Sms => client.set_sms_package(p.price).await?,
            };
            Ok(CommandResult::Ack(ack))
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn subscriber_error(err: billdesk_api::Error, msisdn: &Msisdn) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound {
            entity_type: "subscriber".into(),
            identifier: msisdn.to_string(),
        }
    } else {
        err.into()
    }
}

fn expect_subscriber(result: CommandResult) -> Result<Option<Subscriber>, CoreError> {
    match result {
        CommandResult::Subscriber(s) => Ok(s),
        other => Err(unexpected(&other)),
    }
}

fn expect_transaction(result: CommandResult) -> Result<Option<TransactionRecord>, CoreError> {
    match result {
        CommandResult::Transaction(t) => Ok(t),
        other => Err(unexpected(&other)),
    }
}

fn expect_ack(result: CommandResult) -> Result<serde_json::Value, CoreError> {
    match result {
        CommandResult::Ack(v) => Ok(v),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(result: &CommandResult) -> CoreError {
    CoreError::Internal(format!("unexpected command result: {result:?}"))
}
