use std::sync::Arc;

use board_contract::{ContractId, Executor, MessageBoard};
use board_gateway::dispatcher::Dispatcher;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub board: Arc<MessageBoard>,
    pub executor: Executor,
    pub dispatcher: Dispatcher,
    pub jwt_secret: String,
    pub contract_id: ContractId,
    pub app_name: String,
}

impl AppStateInner {
    /// Start the executor and wire its events into the event gateway.
    /// Must be called from within a tokio runtime.
    pub fn start(
        board: Arc<MessageBoard>,
        jwt_secret: String,
        contract_id: ContractId,
        app_name: String,
    ) -> AppState {
        let executor = Executor::start(board.clone());
        let dispatcher = Dispatcher::new();
        dispatcher.forward_tx_events(executor.subscribe());

        Arc::new(Self {
            board,
            executor,
            dispatcher,
            jwt_secret,
            contract_id,
            app_name,
        })
    }
}
