use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use inkpad::api::BlogApi;
use inkpad::commands::category::{CategoryInput, CategoryNode, CategoryPatch};
use inkpad::commands::info::InfoPatch;
use inkpad::commands::post::{PageRequest, PostFilter, PostInput, PostView};
use inkpad::config::InkpadConfig;
use inkpad::error::Result;
use inkpad::model::Viewer;
use inkpad::store::fs::FsBackend;
use inkpad::store::BlogStore;
use std::path::PathBuf;

mod args;
use args::{CategoryCommands, Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: BlogApi<FsBackend>,
    page_size: usize,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Init => handle_init(&mut ctx),
        Commands::List {
            category,
            keywords,
            tags,
            order,
            page,
        } => handle_list(&ctx, category, keywords, tags, order, page),
        Commands::View { id, deleted } => handle_view(&ctx, id, deleted),
        Commands::Create {
            title,
            content,
            category,
            tags,
            hidden,
        } => handle_create(&mut ctx, title, content, category, tags, hidden),
        Commands::Delete { ids, gc_tags } => handle_delete(&mut ctx, ids, gc_tags),
        Commands::Tree => handle_tree(&ctx),
        Commands::Category(command) => handle_category(&mut ctx, command),
        Commands::Tags { keyword } => handle_tags(&ctx, keyword),
        Commands::Info { title, description } => handle_info(&mut ctx, title, description),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => ProjectDirs::from("com", "inkpad", "inkpad")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".inkpad")),
    };
    let config = InkpadConfig::load(&data_dir).unwrap_or_default();

    let viewer = if cli.public {
        Viewer::anonymous()
    } else {
        Viewer::author()
    };
    let store = BlogStore::open(FsBackend::new(&data_dir))?;

    Ok(AppContext {
        api: BlogApi::new(store, viewer),
        page_size: config.page_size,
    })
}

fn handle_init(ctx: &mut AppContext) -> Result<()> {
    // writing the (possibly empty) site info record creates the data file
    let info = ctx.api.site_info();
    ctx.api.update_info(InfoPatch {
        title: Some(info.title),
        ..Default::default()
    })?;
    println!("{}", "Initialized blog data.".green());
    Ok(())
}

fn handle_list(
    ctx: &AppContext,
    category: Option<u32>,
    keywords: Option<String>,
    tags: Vec<String>,
    order: String,
    page: usize,
) -> Result<()> {
    let filter = PostFilter {
        category,
        keywords,
        tags,
        order_by: order.parse()?,
        ..Default::default()
    };
    let request = PageRequest {
        page_size: Some(ctx.page_size),
        offset: page * ctx.page_size,
        target_post: None,
    };
    let listed = ctx.api.posts(&filter, &request)?;

    if listed.items.is_empty() {
        println!("No posts found.");
        return Ok(());
    }
    for view in &listed.items {
        print_post_line(view);
    }
    println!(
        "{}",
        format!(
            "page {}/{} ({} posts)",
            listed.current_page + 1,
            listed.total_pages,
            listed.total
        )
        .dimmed()
    );
    Ok(())
}

fn handle_view(ctx: &AppContext, id: u32, deleted: bool) -> Result<()> {
    let view = ctx.api.post(id, deleted)?;
    println!(
        "{} {}",
        format!("#{}", view.post.id).yellow(),
        view.post.body.title.bold()
    );
    println!("--------------------------------");
    println!("category: {}", view.category.name);
    if !view.post.body.tags.is_empty() {
        let tags: Vec<String> = view.post.body.tags.iter().map(|t| format!("#{t}")).collect();
        println!("tags: {}", tags.join(" ").cyan());
    }
    println!("created: {}", view.post.created_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!("{}", view.post.body.text_content);
    Ok(())
}

fn handle_create(
    ctx: &mut AppContext,
    title: String,
    content: String,
    category: Option<u32>,
    tags: Vec<String>,
    hidden: bool,
) -> Result<()> {
    let view = ctx.api.create_post(PostInput {
        text_content: content.clone(),
        content,
        title,
        category,
        thumbnail: None,
        images: Vec::new(),
        tags: tags.into_iter().collect(),
        is_hidden: hidden,
    })?;
    println!(
        "{}",
        format!("Created post #{}: {}", view.post.id, view.post.body.title).green()
    );
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, ids: Vec<u32>, gc_tags: bool) -> Result<()> {
    for id in ids {
        ctx.api.delete_post(id, gc_tags)?;
        println!("{}", format!("Deleted post #{}", id).green());
    }
    Ok(())
}

fn handle_tree(ctx: &AppContext) -> Result<()> {
    fn print_node(node: &CategoryNode) {
        let indent = "  ".repeat(node.level as usize + 1);
        let name = if node.is_hidden {
            node.name.dimmed()
        } else {
            node.name.normal()
        };
        println!("{}{} {}", indent, name, format!("({})", node.post_count).dimmed());
        for child in &node.subcategories {
            print_node(child);
        }
    }
    for node in ctx.api.category_hierarchy() {
        print_node(&node);
    }
    Ok(())
}

fn handle_category(ctx: &mut AppContext, command: CategoryCommands) -> Result<()> {
    match command {
        CategoryCommands::Add {
            name,
            description,
            parent,
            hidden,
        } => {
            let view = ctx.api.create_category(CategoryInput {
                name,
                description,
                is_hidden: hidden,
                cover_image: None,
                subcategory_of: parent,
            })?;
            println!(
                "{}",
                format!("Created category #{}: {}", view.id.unwrap_or(0), view.name).green()
            );
        }
        CategoryCommands::List => {
            for view in ctx.api.categories() {
                let indent = "  ".repeat(view.level as usize);
                let id = format!("#{}", view.id.unwrap_or(0));
                println!("{}{} {}", indent, id.yellow(), view.name);
            }
        }
        CategoryCommands::Hide { id } => {
            ctx.api.update_category(
                id,
                CategoryPatch {
                    is_hidden: Some(true),
                    ..Default::default()
                },
            )?;
            println!("{}", format!("Hid category #{} and its subtree", id).green());
        }
        CategoryCommands::Delete { id, delete_posts } => {
            ctx.api.delete_category(id, delete_posts)?;
            println!("{}", format!("Deleted category #{}", id).green());
        }
    }
    Ok(())
}

fn handle_tags(ctx: &AppContext, keyword: Option<String>) -> Result<()> {
    let tags = ctx.api.hashtags(keyword.as_deref(), None)?;
    if tags.is_empty() {
        println!("No tags found.");
        return Ok(());
    }
    for tag in tags {
        println!("{} {}", format!("#{}", tag.name).cyan(), format!("({})", tag.id).dimmed());
    }
    Ok(())
}

fn handle_info(
    ctx: &mut AppContext,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if title.is_some() || description.is_some() {
        ctx.api.update_info(InfoPatch {
            title,
            description,
            ..Default::default()
        })?;
        println!("{}", "Updated site info.".green());
    }
    let info = ctx.api.site_info();
    println!("{}", info.title.bold());
    if !info.description.is_empty() {
        println!("{}", info.description);
    }
    Ok(())
}

fn print_post_line(view: &PostView) {
    let id = format!("{:>4}.", view.post.id);
    let marker = if view.post.is_hidden { "·" } else { " " };
    let date = view.post.created_at.format("%Y-%m-%d").to_string();
    println!(
        "{} {} {}  {} {}",
        id.yellow(),
        marker,
        view.post.body.title,
        format!("[{}]", view.category.name).dimmed(),
        date.dimmed()
    );
}
