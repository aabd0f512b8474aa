use chrono::Local;
use clap::{Args, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::admin::parse_features;
use crate::api::LiveSiteClient;
use crate::booking::BookingForm;
use crate::config::Config;
use crate::mirror::Resolved;
use crate::models::{
  MessageDraft, OfferDraft, PlanDraft, RecordId, ReviewDecision, SiteSettings,
  DISCLAIMER_PAGE_CHOICES,
};

#[derive(Parser, Debug)]
#[command(name = "kpb")]
#[command(about = "Back-office client for the King Play booking site, with offline fallback")]
#[command(version)]
pub struct Cli {
  /// Path to config file (default: $XDG_CONFIG_HOME/kpb/config.yaml)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// API base URL, overrides the config file
  #[arg(long)]
  pub api_url: Option<String>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage plans
  Plans {
    #[command(subcommand)]
    action: PlanAction,
  },
  /// Review and submit bookings
  Bookings {
    #[command(subcommand)]
    action: BookingAction,
  },
  /// Contact messages
  Messages {
    #[command(subcommand)]
    action: MessageAction,
  },
  /// Manage offers
  Offers {
    #[command(subcommand)]
    action: OfferAction,
  },
  /// Site settings
  Settings {
    #[command(subcommand)]
    action: SettingsAction,
  },
  /// Dashboard counters
  Stats,
  /// Check whether the API server is reachable
  Health,
  /// Inspect the local mirror
  Mirror {
    #[command(subcommand)]
    action: MirrorAction,
  },
}

#[derive(Subcommand, Debug)]
pub enum PlanAction {
  List,
  Add(PlanArgs),
  /// Replace a plan's fields
  Update {
    id: RecordId,
    #[command(flatten)]
    plan: PlanArgs,
  },
  Delete {
    id: RecordId,
  },
}

#[derive(Args, Debug)]
pub struct PlanArgs {
  #[arg(long)]
  pub name: String,
  #[arg(long)]
  pub price: String,
  #[arg(long)]
  pub duration: String,
  /// Comma-separated feature list
  #[arg(long, default_value = "")]
  pub features: String,
  #[arg(long)]
  pub description: Option<String>,
  /// Highlight the plan as most popular
  #[arg(long)]
  pub popular: bool,
}

impl From<PlanArgs> for PlanDraft {
  fn from(args: PlanArgs) -> Self {
    Self {
      name: args.name,
      price: args.price,
      duration: args.duration,
      features: parse_features(&args.features),
      description: args.description,
      is_popular: args.popular,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum BookingAction {
  List,
  Submit(BookingArgs),
  Approve { id: RecordId },
  Reject { id: RecordId },
  Delete { id: RecordId },
}

#[derive(Args, Debug)]
pub struct BookingArgs {
  #[arg(long)]
  pub full_name: String,
  #[arg(long)]
  pub phone: String,
  #[arg(long)]
  pub email: String,
  /// Date of birth, YYYY-MM-DD
  #[arg(long)]
  pub dob: String,
  #[arg(long)]
  pub state: String,
  #[arg(long)]
  pub city: String,
  #[arg(long)]
  pub address: String,
  /// Requested time, HH:MM
  #[arg(long)]
  pub time: String,
  /// Plan id
  #[arg(long)]
  pub plan: String,
  #[arg(long, default_value = "")]
  pub special_requirements: String,
  /// Accept the legal compliance statement
  #[arg(long)]
  pub agree_legal: bool,
}

impl From<BookingArgs> for BookingForm {
  fn from(args: BookingArgs) -> Self {
    Self {
      full_name: args.full_name,
      phone: args.phone,
      email: args.email,
      dob: args.dob,
      state: args.state,
      city: args.city,
      address: args.address,
      time: args.time,
      plan_id: args.plan,
      special_requirements: args.special_requirements,
      agreed_to_legal: args.agree_legal,
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum MessageAction {
  List,
  Send {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    message: String,
  },
  Delete {
    id: RecordId,
  },
}

#[derive(Subcommand, Debug)]
pub enum OfferAction {
  List,
  Add {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    /// Create the offer switched off
    #[arg(long)]
    inactive: bool,
  },
  Toggle {
    id: RecordId,
  },
  Delete {
    id: RecordId,
  },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
  Show,
  /// Replace settings with the contents of a YAML or JSON file
  Set { file: PathBuf },
  /// Show or hide the disclaimer banner on a page
  Disclaimer { page: String },
}

#[derive(Subcommand, Debug)]
pub enum MirrorAction {
  /// List mirrored paths
  List,
  /// Print the mirrored value for a path
  Show { path: String },
  /// Drop every mirrored value
  Clear,
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
  let mut config = Config::load(cli.config.as_deref())?;
  if let Some(url) = cli.api_url {
    config.api.base_url = url;
    config.validate()?;
  }

  let client = LiveSiteClient::connect(&config)?;
  tracing::debug!(base_url = %config.api.base_url, "Client ready");

  match cli.command {
    Command::Plans { action } => plans(&client, action).await,
    Command::Bookings { action } => bookings(&client, action).await,
    Command::Messages { action } => messages(&client, action).await,
    Command::Offers { action } => offers(&client, action).await,
    Command::Settings { action } => settings(&client, action).await,
    Command::Stats => print(&client.stats().await),
    Command::Health => {
      if client.check_health().await {
        println!("{} is reachable", config.api.base_url);
        Ok(())
      } else {
        Err(eyre!("{} is not reachable", config.api.base_url))
      }
    }
    Command::Mirror { action } => mirror(&client, action),
  }
}

async fn plans(client: &LiveSiteClient, action: PlanAction) -> Result<()> {
  match action {
    PlanAction::List => print(&client.plans().await),
    PlanAction::Add(args) => print(&client.create_plan(&args.into()).await?),
    PlanAction::Update { id, plan } => print(&client.update_plan(&id, &plan.into()).await?),
    PlanAction::Delete { id } => print(&client.delete_plan(&id).await),
  }
}

async fn bookings(client: &LiveSiteClient, action: BookingAction) -> Result<()> {
  match action {
    BookingAction::List => print(&client.bookings().await),
    BookingAction::Submit(args) => {
      let plans = client.plans().await;
      let payload = BookingForm::from(args).into_payload(&plans.data, Local::now().date_naive())?;
      print(&client.submit_booking(&payload).await?)
    }
    BookingAction::Approve { id } => {
      print(&client.review_booking(&id, ReviewDecision::Approve).await)
    }
    BookingAction::Reject { id } => print(&client.review_booking(&id, ReviewDecision::Reject).await),
    BookingAction::Delete { id } => print(&client.delete_booking(&id).await),
  }
}

async fn messages(client: &LiveSiteClient, action: MessageAction) -> Result<()> {
  match action {
    MessageAction::List => print(&client.messages().await),
    MessageAction::Send {
      name,
      email,
      message,
    } => {
      let draft = MessageDraft {
        name,
        email,
        message,
      };
      print(&client.send_message(&draft).await?)
    }
    MessageAction::Delete { id } => print(&client.delete_message(&id).await),
  }
}

async fn offers(client: &LiveSiteClient, action: OfferAction) -> Result<()> {
  match action {
    OfferAction::List => print(&client.offers().await),
    OfferAction::Add {
      title,
      description,
      inactive,
    } => {
      let draft = OfferDraft {
        title,
        description,
        is_active: !inactive,
      };
      print(&client.create_offer(&draft).await?)
    }
    OfferAction::Toggle { id } => print(&client.toggle_offer(&id).await?),
    OfferAction::Delete { id } => print(&client.delete_offer(&id).await),
  }
}

async fn settings(client: &LiveSiteClient, action: SettingsAction) -> Result<()> {
  match action {
    SettingsAction::Show => print(&client.settings().await),
    SettingsAction::Set { file } => {
      let settings = read_settings_file(&file)?;
      print(&client.save_settings(&settings).await?)
    }
    SettingsAction::Disclaimer { page } => {
      if !DISCLAIMER_PAGE_CHOICES.contains(&page.as_str()) {
        return Err(eyre!(
          "Unknown page '{}', expected one of: {}",
          page,
          DISCLAIMER_PAGE_CHOICES.join(", ")
        ));
      }
      let mut settings = current_settings(client).await?;
      let listed = settings.toggle_disclaimer_page(&page);
      let saved = client.save_settings(&settings).await?;
      eprintln!(
        "Disclaimer {} on {}",
        if listed { "shown" } else { "hidden" },
        page
      );
      print(&saved)
    }
  }
}

async fn current_settings(client: &LiveSiteClient) -> Result<SiteSettings> {
  client
    .settings()
    .await
    .data
    .ok_or_else(|| eyre!("No settings available to edit; use `kpb settings set` first"))
}

fn read_settings_file(path: &Path) -> Result<SiteSettings> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read settings file {}: {}", path.display(), e))?;

  // YAML is a superset of JSON, so both parse here
  serde_yaml::from_str(&contents)
    .map_err(|e| eyre!("Failed to parse settings file {}: {}", path.display(), e))
}

fn mirror(client: &LiveSiteClient, action: MirrorAction) -> Result<()> {
  let mirror = client.mirror();
  match action {
    MirrorAction::List => {
      let entries = mirror.entries()?;
      if entries.is_empty() {
        println!("Mirror is empty");
      }
      for entry in entries {
        println!(
          "{:<32} {:>8} bytes  saved {}",
          entry.key,
          entry.size,
          entry.saved_at.format("%Y-%m-%d %H:%M:%S")
        );
      }
      Ok(())
    }
    MirrorAction::Show { path } => match mirror.get(&path) {
      Some(value) => print(&value),
      None => Err(eyre!("Nothing mirrored for {}", path)),
    },
    MirrorAction::Clear => {
      let removed = mirror.clear()?;
      println!("Removed {} mirrored value(s)", removed);
      Ok(())
    }
  }
}

/// Pretty JSON on stdout; a note on stderr when the data is not live.
fn print<T: Serialize>(result: &Resolved<T>) -> Result<()> {
  if !result.is_live() {
    eprintln!("(served from {})", result.origin);
  }
  let json = serde_json::to_string_pretty(&result.data)
    .map_err(|e| eyre!("Failed to render output: {}", e))?;
  println!("{}", json);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_plan_add() {
    let cli = Cli::try_parse_from([
      "kpb",
      "plans",
      "add",
      "--name",
      "Sunset Stroll",
      "--price",
      "₹1,999",
      "--duration",
      "1 Hour",
      "--features",
      "Walk, Coffee",
      "--popular",
    ])
    .unwrap();

    let Command::Plans {
      action: PlanAction::Add(args),
    } = cli.command
    else {
      panic!("unexpected command");
    };
    let draft = PlanDraft::from(args);
    assert_eq!(draft.features, vec!["Walk", "Coffee"]);
    assert!(draft.is_popular);
  }

  #[test]
  fn test_parse_record_ids() {
    let cli = Cli::try_parse_from(["kpb", "bookings", "approve", "1700000000000"]).unwrap();
    assert!(matches!(
      cli.command,
      Command::Bookings {
        action: BookingAction::Approve {
          id: RecordId::Number(1700000000000)
        }
      }
    ));

    let cli = Cli::try_parse_from(["kpb", "plans", "delete", "vip"]).unwrap();
    assert!(matches!(
      cli.command,
      Command::Plans {
        action: PlanAction::Delete { id: RecordId::Text(_) }
      }
    ));
  }

  #[test]
  fn test_settings_file_accepts_json() {
    let path = std::env::temp_dir().join(format!("kpb-settings-{}.json", std::process::id()));
    std::fs::write(
      &path,
      r#"{"siteTitle": "Elite", "disclaimerPages": ["/"], "ageGateEnabled": true}"#,
    )
    .unwrap();

    let settings = read_settings_file(&path).unwrap();
    assert_eq!(settings.site_title, "Elite");
    assert_eq!(settings.disclaimer_pages, vec!["/"]);
    assert!(settings.age_gate_enabled);

    let _ = std::fs::remove_file(&path);
  }
}
