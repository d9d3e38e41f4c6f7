use crate::cli::*;
use anyhow::{anyhow, Context};
use libris_core::{
    core_version, default_log_level, init_logging, ArchiveConfig, ArchiveService, Book,
    LibraryArchive, User,
};
use log::info;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("cannot start logging")?;
    }

    if let Command::Version = cli.command {
        println!("libris_core version={}", core_version());
        return Ok(());
    }

    let service = open_service(cli.data_dir.as_deref(), cli.file_name.as_deref())?;
    match cli.command {
        Command::Init => cmd_init(&service),
        Command::Show => cmd_show(&service),
        Command::AddBook(args) => cmd_add_book(&service, args),
        Command::AddUser(args) => cmd_add_user(&service, args),
        Command::Lend(args) => cmd_lend(&service, args),
        Command::Return(args) => cmd_return(&service, args),
        Command::Version => Ok(()),
    }
}

fn open_service(
    data_dir: Option<&str>,
    file_name: Option<&str>,
) -> anyhow::Result<ArchiveService> {
    let data_dir = data_dir.ok_or_else(|| anyhow!("--data-dir is required"))?;
    let mut config = ArchiveConfig::new(data_dir)?;
    if let Some(file_name) = file_name {
        config = config.with_file_name(file_name)?;
    }
    Ok(ArchiveService::new(config.open_store()))
}

fn cmd_init(service: &ArchiveService) -> anyhow::Result<()> {
    let archive = service
        .load_or_initialize()
        .with_context(|| format!("cannot open {}", service.store().path().display()))?;
    println!("Archive ready at {}", service.store().path().display());
    print_counts(&archive);
    Ok(())
}

fn cmd_show(service: &ArchiveService) -> anyhow::Result<()> {
    let archive = service.load()?;
    print_counts(&archive);

    for book in &archive.books {
        let authors = if book.authors.is_empty() {
            "unknown author".to_string()
        } else {
            book.authors.join(", ")
        };
        println!(
            "  book {}  {} ({})  isbn={} copies={}",
            book.id, book.title, authors, book.isbn, book.copies
        );
    }
    for user in &archive.users {
        println!("  user {}  {}", user.id, user.full_name());
    }
    for loan in archive.active_loans() {
        let title = archive
            .find_book(loan.book_id)
            .map_or("?", |book| book.title.as_str());
        println!("  loan {}  \"{}\" due_epoch_ms={}", loan.id, title, loan.due_epoch_ms);
    }
    Ok(())
}

fn cmd_add_book(service: &ArchiveService, args: AddBookArgs) -> anyhow::Result<()> {
    let mut book = Book::new(args.isbn, args.title);
    book.authors = args.authors;
    book.publication_year = args.year;
    book.copies = args.copies;

    let id = service.update(|archive| Ok(archive.add_book(book)))?;
    info!("event=book_added module=cli status=ok");
    println!("Added book {id}");
    Ok(())
}

fn cmd_add_user(service: &ArchiveService, args: AddUserArgs) -> anyhow::Result<()> {
    let mut user = User::new(args.first_name, args.last_name);
    user.email = args.email;

    let id = service.update(|archive| Ok(archive.add_user(user)))?;
    info!("event=user_added module=cli status=ok");
    println!("Added user {id}");
    Ok(())
}

fn cmd_lend(service: &ArchiveService, args: LendArgs) -> anyhow::Result<()> {
    let book_id = parse_id(&args.book, "book")?;
    let user_id = parse_id(&args.user, "user")?;
    let start = now_epoch_ms()?;
    let due = start + i64::from(args.days) * MS_PER_DAY;

    let id = service.update(|archive| archive.record_loan(book_id, user_id, start, due))?;
    info!("event=loan_recorded module=cli status=ok days={}", args.days);
    println!("Recorded loan {id}");
    Ok(())
}

fn cmd_return(service: &ArchiveService, args: ReturnArgs) -> anyhow::Result<()> {
    let loan_id = parse_id(&args.loan, "loan")?;
    let returned_at = now_epoch_ms()?;

    service.update(|archive| archive.mark_returned(loan_id, returned_at))?;
    info!("event=loan_returned module=cli status=ok");
    println!("Returned loan {loan_id}");
    Ok(())
}

fn print_counts(archive: &LibraryArchive) {
    println!(
        "{} books, {} users, {} active loans",
        archive.books.len(),
        archive.users.len(),
        archive.active_loans().count()
    );
}

fn parse_id(value: &str, what: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim()).with_context(|| format!("invalid {what} id `{value}`"))
}

fn now_epoch_ms() -> anyhow::Result<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?;
    Ok(i64::try_from(elapsed.as_millis())?)
}

#[cfg(test)]
mod tests {
    use super::{open_service, parse_id, run_command};
    use crate::cli::Cli;
    use clap::Parser;

    fn run(dir: &tempfile::TempDir, args: &[&str]) -> anyhow::Result<()> {
        let data_dir = dir.path().to_str().unwrap();
        let mut argv = vec!["libris", "--data-dir", data_dir];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv)?)
    }

    #[test]
    fn init_then_add_records_persist() {
        let dir = tempfile::tempdir().unwrap();
        run(&dir, &["init"]).unwrap();
        run(
            &dir,
            &[
                "add-book",
                "--title",
                "Dune",
                "--isbn",
                "978-0441172719",
                "--author",
                "Frank Herbert",
            ],
        )
        .unwrap();
        run(
            &dir,
            &["add-user", "--first-name", "Ada", "--last-name", "Lovelace"],
        )
        .unwrap();

        let service = open_service(dir.path().to_str(), None).unwrap();
        let archive = service.load().unwrap();
        assert_eq!(archive.books.len(), 1);
        assert_eq!(archive.books[0].authors, vec!["Frank Herbert".to_string()]);
        assert_eq!(archive.users.len(), 1);

        let book = archive.books[0].id.to_string();
        let user = archive.users[0].id.to_string();
        run(&dir, &["lend", "--book", &book, "--user", &user, "--days", "7"]).unwrap();

        let archive = service.load().unwrap();
        let loan = archive.active_loans().next().unwrap();
        assert_eq!(loan.due_epoch_ms - loan.start_epoch_ms, 7 * super::MS_PER_DAY);

        let loan_id = loan.id.to_string();
        run(&dir, &["return", "--loan", &loan_id]).unwrap();
        assert_eq!(service.load().unwrap().active_loans().count(), 0);
    }

    #[test]
    fn show_without_archive_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir, &["show"]).is_err());
    }

    #[test]
    fn custom_file_name_is_used() {
        let dir = tempfile::tempdir().unwrap();
        run(&dir, &["--file-name", "branch.json", "init"]).unwrap();
        assert!(dir.path().join("branch.json").exists());
    }

    #[test]
    fn missing_data_dir_is_rejected() {
        assert!(open_service(None, None).is_err());
        assert!(open_service(Some("relative/dir"), None).is_err());
    }

    #[test]
    fn parse_id_reports_what_was_invalid() {
        let err = parse_id("nope", "book").unwrap_err();
        assert!(err.to_string().contains("invalid book id"));
    }
}
