use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finflow::cli::{
    self, AccountsCommands, BillsCommands, CategoriesCommands, Cli, Commands,
};
use finflow::settings::load_settings;

fn init_logging(verbose: bool) {
    // Priority: RUST_LOG env var > --verbose flag or dev_mode > errors only
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose || load_settings().dev_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("error")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Status => cli::status::run(),
        Commands::Add {
            amount,
            transaction_type,
            category,
            description,
            date,
            account,
            currency,
        } => cli::transactions::add(cli::transactions::NewTransaction {
            amount,
            transaction_type,
            category,
            description,
            date,
            account,
            currency,
        }),
        Commands::List {
            month,
            transaction_type,
            category,
            limit,
        } => cli::transactions::list(month, transaction_type, category, limit),
        Commands::Edit {
            id,
            amount,
            transaction_type,
            category,
            description,
            date,
            account,
            currency,
        } => cli::transactions::edit(
            &id,
            cli::transactions::TransactionEdit {
                amount,
                transaction_type,
                category,
                description,
                date,
                account,
                currency,
            },
        ),
        Commands::Delete { id } => cli::transactions::delete(&id),
        Commands::ImportText {
            text,
            account,
            amount,
            dry_run,
        } => cli::transactions::import_text(&text, &account, amount, dry_run),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add {
                name,
                category_type,
                icon,
                color,
            } => cli::categories::add(&name, category_type, &icon, &color),
            CategoriesCommands::Edit {
                id,
                name,
                category_type,
                icon,
                color,
            } => cli::categories::edit(&id, name, category_type, icon, color),
            CategoriesCommands::Delete { id } => cli::categories::delete(&id),
        },
        Commands::Accounts { command } => match command {
            AccountsCommands::List => cli::accounts::list(),
            AccountsCommands::Add {
                name,
                account_type,
                balance,
                currency,
                card_number,
                brand,
            } => cli::accounts::add(cli::accounts::NewAccount {
                name,
                account_type,
                balance,
                currency,
                card_number,
                brand,
            }),
            AccountsCommands::Edit {
                id,
                name,
                account_type,
                balance,
                currency,
                card_number,
                brand,
            } => cli::accounts::edit(
                &id,
                cli::accounts::AccountEdit {
                    name,
                    account_type,
                    balance,
                    currency,
                    card_number,
                    brand,
                },
            ),
            AccountsCommands::Delete { id } => cli::accounts::delete(&id),
        },
        Commands::Bills { command } => match command {
            BillsCommands::List => cli::bills::list(),
            BillsCommands::Add {
                name,
                amount,
                due,
                category,
                recurring,
                frequency,
            } => cli::bills::add(&name, &amount, &due, &category, recurring, frequency),
            BillsCommands::Pay { id, undo } => cli::bills::pay(&id, undo),
            BillsCommands::Delete { id } => cli::bills::delete(&id),
        },
        Commands::Summary => cli::report::summary(),
        Commands::Breakdown { top } => cli::report::breakdown(top),
        Commands::Trend { period } => cli::report::trend(period),
        Commands::Report { command } => cli::report::report(command),
        Commands::Budget {
            category,
            limit,
            period,
        } => cli::report::budget(&category, &limit, period),
        Commands::Export { format, output } => cli::export::run(format, output).map(|_| ()),
        Commands::Convert { amount, from, to } => cli::preferences::convert(&amount, &from, &to),
        Commands::Currency { code, list } => cli::preferences::currency(code, list),
        Commands::Theme { theme } => cli::preferences::theme(theme),
        Commands::Reset { yes } => cli::preferences::reset(yes),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
