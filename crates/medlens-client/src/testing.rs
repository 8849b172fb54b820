//! Test support: a scripted transport and a wired-up client.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use chrono::{TimeZone, Utc};

use medlens_contracts::{
    error::{MedlensError, MedlensResult},
    http::{ApiRequest, ApiResponse},
    session::{AuthResponse, Role, User},
};
use medlens_core::{traits::Transport, FixedClock, RecordingNavigator, Routes};
use medlens_session::{InMemoryStorage, SessionStore};

use crate::ApiClient;

/// Answers requests from a queue and records everything it was sent.
/// Clones share the queue and the record.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<MedlensResult<ApiResponse>>>>,
    sent: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, status: u16, body: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    pub(crate) fn fail(self, reason: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(MedlensError::Transport {
                reason: reason.to_string(),
            }));
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> MedlensResult<ApiResponse> {
        self.sent.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(599, "no scripted reply")))
    }
}

pub(crate) struct Harness {
    pub(crate) client: ApiClient<ScriptedTransport>,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) storage: InMemoryStorage,
    pub(crate) navigator: RecordingNavigator,
}

impl Harness {
    /// Store a doctor session with `token`.
    pub(crate) fn sign_in(&self, token: &str) {
        let auth = AuthResponse {
            access_token: token.to_string(),
            token_type: "bearer".to_string(),
            user: user("drsmith", Role::Doctor),
        };
        self.session.store(&auth).unwrap();
    }
}

pub(crate) fn user(username: &str, role: Role) -> User {
    User {
        id: format!("u-{username}"),
        username: username.to_string(),
        full_name: None,
        email: format!("{username}@clinic.test"),
        role,
    }
}

/// A client against `http://api.test` whose navigator starts on `start_path`.
pub(crate) fn harness(transport: ScriptedTransport, start_path: &str) -> Harness {
    let storage = InMemoryStorage::new();
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 4, 2, 10, 30, 0).unwrap());
    let session = Arc::new(SessionStore::new(
        Box::new(storage.clone()),
        Box::new(clock),
    ));
    let navigator = RecordingNavigator::starting_at(start_path);
    let client = ApiClient::new(
        transport,
        "http://api.test/",
        session.clone(),
        Arc::new(navigator.clone()),
        Routes::default(),
    );
    Harness {
        client,
        session,
        storage,
        navigator,
    }
}
