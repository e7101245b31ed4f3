use std::io;

use clap::Parser;
use console::{style, Term};
use tracing_subscriber::EnvFilter;

use metadmin::core::display::{display_authors, display_feeds, format_date, truncate_title};
use metadmin::{
    ActionOutcome, AdminSession, Decision, DialogKind, DialogService, MetadataGateway,
    DEFAULT_BASE_URL,
};

#[derive(Debug, Parser)]
#[command(
    name = "metadmin",
    about = "Consola de administración para el servicio de metadatos"
)]
struct Cli {
    /// Base URL of the metadata API, e.g. http://localhost:8080/metadata
    #[arg(long)]
    base_url: Option<String>,
}

struct TerminalDialogs {
    term: Term,
}

impl DialogService for TerminalDialogs {
    fn confirm(&self, title: &str, message: &str, kind: DialogKind) -> Decision {
        let _ = self
            .term
            .write_line(&format!("{} {}", badge(kind), style(title).bold()));
        let _ = self.term.write_line(&format!("  {message}"));
        let hint = if kind == DialogKind::Question {
            "  [s = desactivar / n = eliminar / otra tecla = cancelar] > "
        } else {
            "  [s = sí / n = no] > "
        };
        let _ = self.term.write_str(hint);
        match self.term.read_line() {
            Ok(answer) => match answer.trim().to_lowercase().as_str() {
                "s" | "si" | "sí" | "y" => Decision::Confirmed,
                "n" | "no" => Decision::Cancelled,
                _ => Decision::Dismissed,
            },
            Err(_) => Decision::Dismissed,
        }
    }

    fn notify(&self, title: &str, message: &str, kind: DialogKind) {
        let _ = self.term.write_line(&format!(
            "{} {} {}",
            badge(kind),
            style(title).bold(),
            message
        ));
    }
}

fn badge(kind: DialogKind) -> String {
    match kind {
        DialogKind::Info => style("[info]").cyan().to_string(),
        DialogKind::Success => style("[ok]").green().to_string(),
        DialogKind::Warning => style("[aviso]").yellow().to_string(),
        DialogKind::Error => style("[error]").red().to_string(),
        DialogKind::Question => style("[?]").magenta().to_string(),
    }
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::from_filename(".env.local");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("metadmin=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let base_url = cli
        .base_url
        .or_else(|| std::env::var("METADMIN_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(shell(base_url))
}

async fn shell(base_url: String) -> Result<(), Box<dyn std::error::Error>> {
    let term = Term::stdout();
    let gateway = MetadataGateway::new(base_url)?;
    let mut session = AdminSession::new(
        gateway,
        TerminalDialogs {
            term: Term::stdout(),
        },
    );

    session.load(false).await;
    render(&term, &session);
    term.write_line("escribe 'help' para ver los comandos")?;

    loop {
        term.write_str("metadmin> ")?;
        let line = term.read_line()?;
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "" => {}
            "list" | "ls" => render(&term, &session),
            "page" => match rest.parse::<usize>() {
                Ok(page) => {
                    session.listing_mut().set_page(page);
                    render(&term, &session);
                }
                Err(_) => term.write_line("número de página inválido")?,
            },
            "next" => {
                let page = session.listing().current_page() + 1;
                session.listing_mut().set_page(page);
                render(&term, &session);
            }
            "prev" => {
                let page = session.listing().current_page().saturating_sub(1).max(1);
                session.listing_mut().set_page(page);
                render(&term, &session);
            }
            "title" => {
                session.listing_mut().set_title_filter(rest);
                render(&term, &session);
            }
            "date" => {
                session.listing_mut().set_date_filter(rest);
                render(&term, &session);
            }
            "clear" => {
                session.listing_mut().clear_filters();
                render(&term, &session);
            }
            "toggle" => {
                session.toggle_mode().await;
                render(&term, &session);
            }
            "refresh" => {
                session.load(true).await;
                render(&term, &session);
            }
            "add" => {
                session.submit_new(rest).await;
                render(&term, &session);
            }
            "edit" => match rest.parse::<i64>() {
                Ok(id) => {
                    edit_record(&term, &mut session, id).await?;
                    render(&term, &session);
                }
                Err(_) => term.write_line("id inválido")?,
            },
            "activate" => match rest.parse::<i64>() {
                Ok(id) => {
                    session.request_activate(id).await;
                    render(&term, &session);
                }
                Err(_) => term.write_line("id inválido")?,
            },
            "drop" => match rest.parse::<i64>() {
                Ok(id) => {
                    session.request_deactivate_or_delete(id).await;
                    render(&term, &session);
                }
                Err(_) => term.write_line("id inválido")?,
            },
            "help" => print_help(&term)?,
            "quit" | "exit" | "q" => break,
            other => term.write_line(&format!("comando desconocido: {other} (prueba 'help')"))?,
        }
    }
    Ok(())
}

fn render<D: DialogService>(term: &Term, session: &AdminSession<D>) {
    let listing = session.listing();
    let mode = if listing.mode().is_active() {
        "activos"
    } else {
        "inactivos"
    };
    let _ = term.write_line(&format!(
        "— metadatos {mode} | título: '{}' | fecha: '{}' | página {} de {} ({} registros)",
        listing.title_filter(),
        listing.date_filter(),
        listing.current_page(),
        listing.total_pages(),
        listing.filtered().len(),
    ));
    if listing.visible_page().is_empty() {
        let _ = term.write_line("  (página vacía)");
        return;
    }
    for record in listing.visible_page() {
        let date = format_date(record.publication_date.as_deref().unwrap_or_default());
        let _ = term.write_line(&format!(
            "  #{:<5} {:<45} {:<25} {}",
            record.id,
            truncate_title(&record.title, 40),
            date,
            display_authors(&record.authors),
        ));
        for feed in display_feeds(&record.feeds) {
            let _ = term.write_line(&format!("         · {feed}"));
        }
    }
}

async fn edit_record<D: DialogService>(
    term: &Term,
    session: &mut AdminSession<D>,
    id: i64,
) -> io::Result<()> {
    if !session.begin_edit(id) {
        term.write_line(&format!("no hay ningún metadato con id {id} en la lista"))?;
        return Ok(());
    }
    term.write_line("valores actuales entre [corchetes]; deja vacío para mantenerlos")?;
    loop {
        if let Some(fields) = session.edit_fields_mut() {
            let title = prompt(term, "título", &fields.title)?;
            fields.title = title;
            let date = prompt(term, "fecha (YYYY-MM-DD)", &fields.publication_date)?;
            fields.publication_date = date;
            let time = prompt(term, "hora (HH:MM)", &fields.publication_time)?;
            fields.publication_time = time;
            let image_url = prompt(term, "imagen", &fields.image_url)?;
            fields.image_url = image_url;
            let feeds = prompt(term, "feeds (JSON)", &fields.feeds)?;
            fields.feeds = feeds;
            let authors = prompt(term, "autores (JSON)", &fields.authors)?;
            fields.authors = authors;
        }
        match session.submit_update().await {
            // the buffer survives a parse failure, so the operator can fix it
            ActionOutcome::InvalidInput => {
                term.write_line("corrige los campos JSON e inténtalo de nuevo")?;
            }
            ActionOutcome::Completed => break,
            _ => {
                session.cancel_edit();
                break;
            }
        }
    }
    Ok(())
}

fn prompt(term: &Term, label: &str, current: &str) -> io::Result<String> {
    term.write_str(&format!("  {label} [{current}]: "))?;
    let input = term.read_line()?;
    let trimmed = input.trim();
    Ok(if trimmed.is_empty() {
        current.to_string()
    } else {
        trimmed.to_string()
    })
}

fn print_help(term: &Term) -> io::Result<()> {
    term.write_line("comandos:")?;
    term.write_line("  list              muestra la página actual")?;
    term.write_line("  page N / next / prev")?;
    term.write_line("  title <texto>     filtra por título (sin tildes ni mayúsculas)")?;
    term.write_line("  date <texto>      filtra por fecha (subcadena ISO)")?;
    term.write_line("  clear             limpia los filtros")?;
    term.write_line("  toggle            cambia entre activos e inactivos")?;
    term.write_line("  refresh           recarga desde el servidor")?;
    term.write_line("  add <url>         envía una URL para analizar")?;
    term.write_line("  edit <id>         edita un metadato campo a campo")?;
    term.write_line("  activate <id>     activa un metadato (con confirmación)")?;
    term.write_line("  drop <id>         desactiva o elimina un metadato")?;
    term.write_line("  quit              sale")?;
    Ok(())
}
