use anyhow::bail;
use blogly_server::application::post_service::PostService;
use blogly_server::application::tag_service::TagService;
use blogly_server::application::user_service::UserService;
use blogly_server::data::Repositories;
use blogly_server::infrastructure::config::{AppConfig, Storage};
use blogly_server::infrastructure::database;
use blogly_server::infrastructure::logging::{LogFormat, init_logging};
use clap::Parser;

const SEED_USERS: [(&str, &str, &str); 3] = [
    (
        "Alan",
        "Alda",
        "https://pbs.twimg.com/profile_images/595641780768514048/umqK7iN5_400x400.jpg",
    ),
    (
        "Joel",
        "Burton",
        "https://www.rithmschool.com/assets/team/joel-a76cc6f1fb942e80144b05905493a2bf10a73adaab988df12a4abbb6762097bb.png",
    ),
    (
        "Jane",
        "Smith",
        "https://acultivatednest.com/wp-content/uploads/2018/06/should-you-be-like-an-old-fashioned-1950s-housewife-vintage-woman-artwork.jpg",
    ),
];

const SEED_TAGS: [&str; 4] = ["fun", "even more", "bloop", "zope"];

/// Title, content, and the tags (by name) attached to each seeded post.
const SEED_POSTS: [(&str, &str, &[&str]); 3] = [
    ("First Post!", "Oh, hai.", &["fun", "even more", "bloop", "zope"]),
    ("Yet Another Post", "This is another post.", &["even more"]),
    ("Flask is Awesome", "Yayyyyyyy!!!!!!!", &["zope"]),
];

#[derive(Parser, Debug)]
#[clap(name = "blogly", about = "Administer the Blogly database")]
struct Cli {
    /// Overrides DATABASE_URL.
    #[clap(long)]
    database_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Load the sample users, posts, and tags.
    Seed {
        /// Empty every table first.
        #[clap(long)]
        reset: bool,
    },
    /// Print every user.
    Users,
    /// Print every tag.
    Tags,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(LogFormat::Compact);

    let mut config = AppConfig::from_env()?;
    if let Some(url) = args.database_url.as_deref() {
        config.storage = Storage::from_url(url);
    }

    match args.command {
        Command::Migrate => {
            let Storage::Postgres { url } = &config.storage else {
                bail!("in-memory storage has no schema to migrate");
            };
            let pool = database::create_pool(url, config.max_connections).await?;
            database::run_migrations(&pool).await?;
            println!("Migrations applied");
        }
        Command::Seed { reset } => {
            let Storage::Postgres { url } = &config.storage else {
                bail!("seeding needs a PostgreSQL DATABASE_URL");
            };
            let pool = database::create_pool(url, config.max_connections).await?;
            database::run_migrations(&pool).await?;
            if reset {
                database::reset(&pool).await?;
            }
            seed(&Repositories::postgres(pool)).await?;
        }
        Command::Users => {
            let repos = database::connect(&config).await?;
            let users = UserService::new(&repos).list_users().await?;
            println!("Users ({})", users.len());
            for user in users {
                println!("- [{}] {}", user.id, user.full_name());
            }
        }
        Command::Tags => {
            let repos = database::connect(&config).await?;
            let tags = TagService::new(&repos).list_tags().await?;
            println!("Tags ({})", tags.len());
            for tag in tags {
                println!("- [{}] {}", tag.id, tag.name);
            }
        }
    }

    Ok(())
}

async fn seed(repos: &Repositories) -> anyhow::Result<()> {
    let users = UserService::new(repos);
    let posts = PostService::new(repos);
    let tags = TagService::new(repos);

    let mut author_id = None;
    for (first, last, image_url) in SEED_USERS {
        let user = users.create_user(first, last, image_url).await?;
        println!("User added: [{}] {}", user.id, user.full_name());
        if first == "Joel" {
            author_id = Some(user.id);
        }
    }
    let Some(author_id) = author_id else {
        bail!("seed author missing");
    };

    let mut created = Vec::with_capacity(SEED_TAGS.len());
    for name in SEED_TAGS {
        let tag = tags.create_tag(name).await?;
        println!("Tag added: [{}] {}", tag.id, tag.name);
        created.push(tag);
    }

    for (title, content, tag_names) in SEED_POSTS {
        let tag_ids: Vec<i32> = created
            .iter()
            .filter(|tag| tag_names.contains(&tag.name.as_str()))
            .map(|tag| tag.id)
            .collect();
        let post = posts.create_post(author_id, title, content, &tag_ids).await?;
        println!("Post added: [{}] {}", post.id, post.title);
    }

    Ok(())
}
