/// Every user-facing message of the application.
///
/// Text lives in the `Display` implementation in `display.rs`.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigNotFound,
    ConfigModuleTracker,
    FlushIntervalMustBePositive,

    // === STORE MESSAGES ===
    StoreLocked(String), // path
    StoreOpened(String), // path
    StoreReconciled { loaded: usize, date: String },
    StoreFlushed(usize), // records
    FinalFlushFailed(String), // error

    // === MONITOR MESSAGES ===
    MonitorStarted {
        flush_interval: u64,
        flush_event_threshold: u64,
    },
    MonitorShuttingDown,
    ErrorInRdevListener(String),

    // === WATCHER MESSAGES ===
    WatcherStartingForeground,
    WatcherReceivedSigterm,
    WatcherReceivedSigint,
    WatcherReceivedCtrlC,
    WatcherCtrlCListenFailed(String), // error
    FailedToCreateSigtermHandler,
    FailedToCreateSigintHandler,

    // === HISTORY MESSAGES ===
    HistoryHeader(usize), // days
    HistoryEmpty,
    HistoryDaysMustBePositive,
    TotalsHeader,

    // === PROMPTS ===
    PromptDataFile,
    PromptFlushInterval,
    PromptFlushEventThreshold,
    PromptHistoryDays,
    PromptFillGaps,
}
