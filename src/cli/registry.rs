//! Static table of driver commands

use std::fmt;

/// Menu section a command is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Setup,
    Simulation,
    Utility,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Setup, Category::Simulation, Category::Utility];

    pub fn title(&self) -> &'static str {
        match self {
            Category::Setup => "Setup",
            Category::Simulation => "Simulation",
            Category::Utility => "Utilities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// What a command does when run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    SetupNgrok,
    StartNgrok,
    SetupDatabase,
    CreateStreamInstance,
    SetupConnections,
    SetupProcessors,
    SetupAll,
    StartProcessors { include_kafka: bool },
    SimulateShopping,
    GetOrderHistory,
    ListClusters,
}

/// One entry of the command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub handler: Handler,
    /// Prompt for the Kafka credentials before running
    pub needs_kafka: bool,
    /// Run without checking the env file first
    pub skips_environment: bool,
}

impl CommandSpec {
    const fn new(
        name: &'static str,
        label: &'static str,
        category: Category,
        handler: Handler,
    ) -> Self {
        Self {
            name,
            label,
            category,
            handler,
            needs_kafka: false,
            skips_environment: false,
        }
    }

    const fn kafka(mut self) -> Self {
        self.needs_kafka = true;
        self
    }

    const fn standalone(mut self) -> Self {
        self.skips_environment = true;
        self
    }
}

/// Every command, in menu order within each category
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec::new(
        "setup-ngrok",
        "Configure ngrok for local development",
        Category::Setup,
        Handler::SetupNgrok,
    )
    .standalone(),
    CommandSpec::new(
        "start-ngrok",
        "Start ngrok tunnels",
        Category::Setup,
        Handler::StartNgrok,
    )
    .standalone(),
    CommandSpec::new(
        "setup-database",
        "Setup Database and Collections",
        Category::Setup,
        Handler::SetupDatabase,
    ),
    CommandSpec::new(
        "create-stream-processor-instance",
        "Create Stream Processor Instance",
        Category::Setup,
        Handler::CreateStreamInstance,
    ),
    CommandSpec::new(
        "setup-stream-processor-connections",
        "Setup Stream Processor Connections",
        Category::Setup,
        Handler::SetupConnections,
    ),
    CommandSpec::new(
        "setup-stream-processors",
        "Setup Stream Processors",
        Category::Setup,
        Handler::SetupProcessors,
    ),
    CommandSpec::new(
        "setup-all",
        "Run All Setup Steps",
        Category::Setup,
        Handler::SetupAll,
    ),
    CommandSpec::new(
        "start-stream-processors",
        "Start all stream processors",
        Category::Setup,
        Handler::StartProcessors {
            include_kafka: false,
        },
    ),
    CommandSpec::new(
        "start-stream-processors-kafka",
        "Start all stream processors including Kafka",
        Category::Setup,
        Handler::StartProcessors {
            include_kafka: true,
        },
    )
    .kafka(),
    CommandSpec::new(
        "simulate-shopping",
        "Simulate Customer Shopping Activity",
        Category::Simulation,
        Handler::SimulateShopping,
    ),
    CommandSpec::new(
        "get-order-history",
        "Retrieve Order History for an Order",
        Category::Utility,
        Handler::GetOrderHistory,
    ),
    CommandSpec::new(
        "list-clusters",
        "List Atlas Clusters in the Project",
        Category::Utility,
        Handler::ListClusters,
    ),
];

/// Alternative names accepted on the command line
pub const ALIASES: &[(&str, &str)] = &[
    ("setup", "setup-all"),
    ("simulate", "simulate-shopping"),
    ("order-history", "get-order-history"),
];

/// Look up a command by name or alias
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    let name = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, target)| *target)
        .unwrap_or(name);
    COMMANDS.iter().find(|c| c.name == name)
}

/// Commands grouped by category, empty categories left out
pub fn by_category() -> Vec<(Category, Vec<&'static CommandSpec>)> {
    Category::ALL
        .iter()
        .map(|category| {
            let commands: Vec<_> = COMMANDS.iter().filter(|c| c.category == *category).collect();
            (*category, commands)
        })
        .filter(|(_, commands)| !commands.is_empty())
        .collect()
}
