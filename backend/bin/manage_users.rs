use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use prepconnect::{
    AppError,
    constants::DEMO_USERS,
    db::{get_db_pool, migrations, users, DatabaseConfig},
    models::{NewUser, UserRole},
    services::UserDirectory,
    utils::init_logging,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let matches = Command::new("manage_users")
        .about("Maintain the PrepConnect user directory")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Register a single user")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("role")
                        .long("role")
                        .default_value("junior")
                        .value_parser(["junior", "senior", "mentor"]),
                )
                .arg(Arg::new("domain").long("domain"))
                .arg(
                    Arg::new("experience")
                        .long("experience")
                        .help("Years of industry experience")
                        .default_value("0")
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
        .subcommand(Command::new("list").about("Print every registered user"))
        .subcommand(Command::new("seed").about("Create the demo users that are missing"))
        .get_matches();

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;
    migrations::run_migrations(&pool).await?;
    let directory = UserDirectory::new(pool.clone());

    match matches.subcommand() {
        Some(("add", args)) => add_user(&directory, args).await?,
        Some(("list", _)) => {
            for user in users::list_all_users(&pool).await? {
                println!("{}  {:<20} {:<28} {:?}", user.id, user.name, user.email, user.role);
            }
        }
        Some(("seed", _)) => seed_demo_users(&directory).await?,
        _ => unreachable!("subcommand_required is set"),
    }

    Ok(())
}

async fn add_user(directory: &UserDirectory, args: &ArgMatches) -> Result<()> {
    let role: UserRole = args
        .get_one::<String>("role")
        .map(|role| role.parse::<UserRole>())
        .transpose()
        .map_err(|e: String| anyhow::anyhow!(e))?
        .unwrap_or_default();

    let user = directory
        .register(NewUser {
            name: args.get_one::<String>("name").cloned().unwrap_or_default(),
            email: args.get_one::<String>("email").cloned().unwrap_or_default(),
            role,
            domain: args.get_one::<String>("domain").cloned(),
            industry_experience: args.get_one::<i64>("experience").copied().unwrap_or(0),
        })
        .await?;

    println!("{}", user.id);
    Ok(())
}

async fn seed_demo_users(directory: &UserDirectory) -> Result<()> {
    let mut created = 0;

    for (name, email, role) in DEMO_USERS {
        let new_user = NewUser {
            name: name.to_string(),
            email: email.to_string(),
            role: role.parse::<UserRole>().map_err(|e: String| anyhow::anyhow!(e))?,
            domain: None,
            industry_experience: 0,
        };

        match directory.register(new_user).await {
            Ok(user) => {
                created += 1;
                info!("Created demo user {} <{}> as {}", user.name, user.email, user.id);
            }
            Err(AppError::AlreadyExists(_)) => warn!("Demo user {} already exists, skipping", email),
            Err(e) => return Err(e.into()),
        }
    }

    info!("Created {} demo users", created);
    Ok(())
}
