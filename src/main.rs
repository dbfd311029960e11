use anyhow::{anyhow, Result};
use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use reqwest::blocking::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;
use zsx_site::config::{Config, Github, Pagination};
use zsx_site::page::{page_numbers, Page};
use zsx_site::paginator::{Options, Paginator};
use zsx_site::query::UrlHistory;
use zsx_site::util::display_date;
use zsx_site::{content, github, mastodon, talks};

/// The query parameter list pages keep their page number in.
const PAGE_PARAM: &str = "page";

/// How many page numbers either side of the current one the page bar shows.
const PAGE_BAR_EXPAND: usize = 2;

const HTTP_TIMEOUT_SECONDS: u64 = 30;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zsx_site=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let list_args = || {
        vec![
            Arg::with_name("url")
                .long("url")
                .takes_value(true)
                .help("The page URL; its `page` parameter selects the page"),
            Arg::with_name("goto")
                .long("goto")
                .takes_value(true)
                .help("Navigate to this page before printing"),
            Arg::with_name("per-page")
                .long("per-page")
                .takes_value(true)
                .help("Items per page (overrides `pagination.per_page`)"),
        ]
    };

    let matches = App::new("zsx-site")
        .version(crate_version!())
        .about("Paginated content feeds for the blog")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .takes_value(true)
                .default_value(".")
                .help("A directory inside the project (containing or below `blog.yaml`)"),
        )
        .subcommand(
            SubCommand::with_name("talks")
                .about("Shows a page of talks")
                .args(&list_args())
                .arg(
                    Arg::with_name("display")
                        .long("display")
                        .help("Render talk bodies as HTML and format dates"),
                ),
        )
        .subcommand(
            SubCommand::with_name("mastodon")
                .about("Shows a page of Mastodon statuses")
                .args(&list_args())
                .arg(
                    Arg::with_name("display")
                        .long("display")
                        .help("Format dates"),
                ),
        )
        .subcommand(
            SubCommand::with_name("sponsors")
                .about("Shows a page of sponsors")
                .args(&list_args()),
        )
        .subcommand(
            SubCommand::with_name("creativity")
                .about("Shows a page of skill-wall categories")
                .args(&list_args()),
        )
        .subcommand(
            SubCommand::with_name("repo")
                .about("Shows GitHub metadata for a repository")
                .arg(
                    Arg::with_name("REPO")
                        .required(true)
                        .help("`owner/name` or a github.com URL"),
                ),
        )
        .subcommand(
            SubCommand::with_name("pages")
                .about("Prints a page-number bar")
                .arg(Arg::with_name("CURRENT").required(true))
                .arg(Arg::with_name("TOTAL").required(true))
                .arg(
                    Arg::with_name("expand")
                        .long("expand")
                        .takes_value(true)
                        .default_value("2"),
                ),
        )
        .get_matches();

    // `default_value` guarantees presence
    let project = std::fs::canonicalize(Path::new(matches.value_of("project").unwrap()))?;
    let project = project.as_path();

    match matches.subcommand() {
        ("talks", Some(sub)) => {
            let config = Config::from_directory(project)?;
            let mut items = talks::fetch_talks(&client()?, &config.talks);
            if sub.is_present("display") {
                for talk in items.iter_mut() {
                    talk.text = talk.html();
                    talk.date = display_date(&talk.date);
                }
            }
            show(items, &config, "talks", sub)
        }
        ("mastodon", Some(sub)) => {
            let config = Config::from_directory(project)?;
            let mut items = mastodon::fetch_posts(&client()?, &config.mastodon);
            if sub.is_present("display") {
                for post in items.iter_mut() {
                    post.date = display_date(&post.date);
                }
            }
            show(items, &config, "mastodon", sub)
        }
        ("sponsors", Some(sub)) => {
            let config = Config::from_directory(project)?;
            let items = content::load_sponsors(&config.content_directory)?;
            show(items, &config, "sponsors", sub)
        }
        ("creativity", Some(sub)) => {
            let config = Config::from_directory(project)?;
            let items = content::load_creativity(&config.content_directory)?;
            show(items, &config, "creativity", sub)
        }
        ("repo", Some(sub)) => {
            let github_config = match Config::from_directory(project) {
                Ok(config) => config.github,
                Err(_) => Github::default(),
            };
            let token = github_config.token();
            // required argument
            let repo = sub.value_of("REPO").unwrap();
            match github::fetch_repo(&client()?, repo, token.as_deref()) {
                Ok(summary) => {
                    info!(cache_control = github::CACHE_CONTROL, "fetched {}", summary.name);
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                    Ok(())
                }
                Err(e) => Err(anyhow!("{} (HTTP {})", e, e.status_code())),
            }
        }
        ("pages", Some(sub)) => {
            let current: usize = sub.value_of("CURRENT").unwrap().parse()?;
            let total: usize = sub.value_of("TOTAL").unwrap().parse()?;
            let expand: usize = sub.value_of("expand").unwrap().parse()?;
            println!("{}", page_bar(&page_numbers(current, total, expand)));
            Ok(())
        }
        _ => Ok(()),
    }
}

fn client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
        .build()?)
}

fn page_bar(links: &[zsx_site::page::PageLink]) -> String {
    links
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize)]
struct Listing<T> {
    /// The URL after any `--goto` navigation.
    url: String,

    /// How the next page change would be recorded.
    mode: String,

    /// The number of entries in the navigation history.
    history: usize,

    bar: String,
    page: Page<T>,
}

/// Paginates `items`, binding the page to the `page` parameter of the page
/// URL (`--url`, or `{site url}/{section}`), and prints the result as JSON.
fn show<T: Clone + Serialize>(
    items: Vec<T>,
    config: &Config,
    section: &str,
    matches: &ArgMatches,
) -> Result<()> {
    let url = match matches.value_of("url") {
        Some(url) => Url::parse(url)?,
        None => config.url.join(section)?,
    };

    let mut options = Options::default().bind_query(PAGE_PARAM);
    if let Some(per_page) = matches.value_of("per-page") {
        options = options.per_page(per_page.parse()?);
    }
    let pagination: &Pagination = &config.pagination;
    let mut paginator = Paginator::with_store(items, options, pagination, UrlHistory::new(url));

    if let Some(goto) = matches.value_of("goto") {
        let mode = paginator.mode();
        paginator.request_page(goto);
        info!(
            mode = %mode,
            url = %paginator.store().current(),
            "navigated to page {}",
            paginator.page()
        );
    }

    let listing = Listing {
        url: paginator.store().current().to_string(),
        mode: paginator.mode().to_string(),
        history: paginator.store().entries().len(),
        bar: page_bar(&paginator.page_numbers(PAGE_BAR_EXPAND)),
        page: paginator.view(),
    };
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}
