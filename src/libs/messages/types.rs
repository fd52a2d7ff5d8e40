#[derive(Debug, Clone)]
pub enum Message {
    // === CLIENT MESSAGES ===
    ClientCreated(String),
    ClientUpdated(String),
    ClientArchived(String),
    ClientNotFound(String),
    ClientAlreadyExists(String),
    ClientIsArchived(String),
    NoClientsFound,
    ConfirmArchiveClient(String),

    // === SESSION MESSAGES ===
    SessionStarted(String),            // client name
    SessionAlreadyRunning(String),     // client name
    SessionStopped(String, String),    // active, idle durations
    SessionPaused,
    SessionResumed,
    SessionAutoPaused(u64),            // inactivity timeout in minutes
    SessionNotPaused,
    SessionAlreadyPaused,
    NoActiveSession,

    // === RECOVERY MESSAGES ===
    RecoveredSession(String, String), // client name, end timestamp
    RecoveryNothingToDo,
    RecoveryDiscarded,
    InterruptedSessionFound(String), // saved_at timestamp
    SnapshotWriteFailed(String),     // error message

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigParseError,
    ConfigReloadFailed(String), // error
    ConfigModuleTimer,
    ConfigModuleBilling,

    // === INVOICE MESSAGES ===
    InvoiceCreated(String, String), // number, total
    InvoiceNotFound(String),        // number
    InvoicesNotFound,
    NoUninvoicedEntries(String),     // client name
    InvoiceSelectionEmpty,
    EntryNotBillable(String),        // reason
    InvalidPaymentAmount(String),    // reason
    PaymentRecorded(String, String), // number, amount
    InvoicePaidInFull(String),       // number
    PayAmountRequired,

    // === ENTRY MESSAGES ===
    EntriesNotFound,

    // === TAX MESSAGES ===
    TaxSummaryHeader(i32), // year

    // === EXPORT MESSAGES ===
    ExportingData(String, String), // data kind, format
    ExportCompleted(String),       // path

    // === TRACKER/DAEMON MESSAGES ===
    TrackerStarted(u32), // PID
    TrackerStopped(u32), // PID
    TrackerAlreadyRunning(u32), // PID
    TrackerNotRunning,
    TrackerNotRunningPidNotFound,
    TrackerStartingForeground,
    TrackerStoppingExisting(String),     // PID
    TrackerFailedToStopExisting(String), // error
    TrackerFailedToStop(u32),            // PID
    TrackerReceivedSigterm,
    TrackerReceivedSigint,
    TrackerReceivedCtrlC,
    TrackerCtrlCListenFailed(String), // error
    TrackerSignalHandlingNotSupported,
    TrackerError(String),        // error
    TrackerTaskPanicked(String), // error
    TrackerExitedNormally,
    TrackerShuttingDown,
    DaemonModeNotSupported,
    FailedToGetCurrentExecutable,
    FailedToCreateSigtermHandler,
    FailedToCreateSigintHandler,
    StopRequestSent,
    PauseRequestSent,
    ResumeRequestSent,
    ControlCommandInvalid(String), // command

    // === DATABASE MESSAGES ===
    MigrationsFound(usize),        // count
    RunningMigration(u32, String), // version, name
    MigrationCompleted(u32),       // version
    MigrationFailed(u32, String),  // version, error
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseUpToDate,
    DatabaseNeedsUpdate,
    MigrationHistory,
    NothingToRollback,
    RollingBack(u32, u32),  // from, to
    RollbackCompleted(u32), // version

    // === FILE SYSTEM MESSAGES ===
    InvalidPidFileContent,

    // === PROCESS MESSAGES ===
    FailedToOpenProcess(u32),      // error code
    FailedToTerminateProcess(u32), // error code
    ProcessTerminationNotSupported,

    // === PROMPTS ===
    PromptClientName,
    PromptHourlyRate,
    PromptTrackActivity,
    PromptMarkFavorite,
    PromptInactivityTimeout,
    PromptAutosaveInterval,
    PromptPollInterval,
    PromptPaymentTerms,
    PromptSelectModules,
    PromptSelectClient,
    PromptSelectEntries,
    PromptClientAction,
    PromptInvoiceNumber,
    PromptPaymentAmount,
    ConfirmInvoiceCreate(usize, String), // entry count, total

    // === GENERAL MESSAGES ===
    OperationCancelled,
}
