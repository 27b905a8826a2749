use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use herald_core::{Filter, NotificationKind, SortOrder};

/// Herald: notifications from the terminal
#[derive(Parser)]
#[command(name = "herald", version, about)]
pub struct Cli {
    /// Base URL of the notification store
    #[arg(long, env = "HERALD_SERVER_URL", default_value = "http://127.0.0.1:3400")]
    pub server: String,

    /// Whose notifications to show
    #[arg(long, env = "HERALD_USER_ID")]
    pub user: Uuid,

    /// Bearer token sent with every request
    #[arg(long, env = "HERALD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll in the background and redraw the dropdown on every change (default)
    Watch,

    /// Side-panel view of the loaded notifications
    List {
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
        #[arg(long, value_enum, default_value = "priority")]
        sort: SortArg,
    },

    /// Paginated history with search over the loaded pages
    History {
        /// Free text matched against title and message
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        /// How many pages to load before searching
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Mark one notification read, paging back through history to find it
    Read { id: Uuid },

    /// Mark every loaded notification read
    ReadAll,

    /// Delete one notification, paging back through history to find it
    Delete { id: Uuid },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FilterArg {
    All,
    Unread,
    High,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Filter::All,
            FilterArg::Unread => Filter::Unread,
            FilterArg::High => Filter::HighPriority,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    Priority,
    Time,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Priority => SortOrder::Priority,
            SortArg::Time => SortOrder::Time,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    JobMatch,
    ApplicationUpdate,
    Interview,
    Deadline,
    Digest,
    Payment,
    Message,
    System,
}

impl From<KindArg> for NotificationKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::JobMatch => NotificationKind::JobMatch,
            KindArg::ApplicationUpdate => NotificationKind::ApplicationUpdate,
            KindArg::Interview => NotificationKind::Interview,
            KindArg::Deadline => NotificationKind::Deadline,
            KindArg::Digest => NotificationKind::Digest,
            KindArg::Payment => NotificationKind::Payment,
            KindArg::Message => NotificationKind::Message,
            KindArg::System => NotificationKind::System,
        }
    }
}
