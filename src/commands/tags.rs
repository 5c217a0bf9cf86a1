//! The tag corpus: pre-authored replies loaded once at startup.
//!
//! `tags/foo.json` registers the tag `foo`; nested directories produce
//! namespaced keys like `category/name`. A directory with the same name as
//! a tag holds its file attachments (JSON files in there are other tags and
//! are skipped).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fs, io};

use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::commands::say_ephemeral;
use crate::{Context, Error};

/// Discord caps autocomplete responses at 25 suggestions.
const MAX_SUGGESTIONS: usize = 25;

#[derive(Debug, Deserialize)]
struct TagFile {
    content: String,
}

#[derive(Debug, Clone)]
pub struct TagEntry {
    pub content: String,
    pub attachments: Vec<PathBuf>,
}

/// Exact-match lookup table from tag name to response content. Built once,
/// never invalidated during the process lifetime.
#[derive(Debug, Default)]
pub struct TagStore {
    tags: HashMap<String, TagEntry>,
}

impl TagStore {
    pub fn load(root: &Path) -> io::Result<Self> {
        let mut tags = HashMap::new();
        if root.is_dir() {
            walk(root, root, &mut tags)?;
        }
        info!("loaded {} tags", tags.len());

        Ok(Self { tags })
    }

    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.tags.get(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Case-insensitive substring suggestions. With no filter text the whole
    /// corpus is offered, unless it exceeds the platform cap, in which case
    /// nothing is suggested at all.
    pub fn suggest(&self, partial: &str) -> Vec<String> {
        if partial.is_empty() {
            if self.tags.len() > MAX_SUGGESTIONS {
                return Vec::new();
            }
            let mut all: Vec<String> = self.tags.keys().cloned().collect();
            all.sort();
            return all;
        }

        let needle = partial.to_lowercase();
        let mut matches: Vec<String> = self
            .tags
            .keys()
            .filter(|name| name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort();
        matches.truncate(MAX_SUGGESTIONS);

        matches
    }
}

fn walk(root: &Path, dir: &Path, tags: &mut HashMap<String, TagEntry>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            walk(root, &path, tags)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            let name = tag_name(root, &path);
            let file: TagFile = serde_json::from_str(&fs::read_to_string(&path)?)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            let attachments = attachments_for(&path)?;

            tags.insert(
                name,
                TagEntry {
                    content: file.content,
                    attachments,
                },
            );
        }
    }

    Ok(())
}

fn tag_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .with_extension("")
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Attachments live in a directory named like the tag, next to its file.
fn attachments_for(tag_path: &Path) -> io::Result<Vec<PathBuf>> {
    let dir = tag_path.with_extension("");
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.is_file() && !path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Posts a tag.
#[instrument(skip(ctx))]
#[poise::command(slash_command, category = "Utility")]
pub async fn tag(
    ctx: Context<'_>,
    #[description = "The name of the tag to post."]
    #[autocomplete = "autocomplete_tag"]
    name: String,
) -> Result<(), Error> {
    let Some(entry) = ctx.data().tags.get(&name).cloned() else {
        return say_ephemeral(ctx, format!("❌ Tag \"{name}\" not found!")).await;
    };

    let mut reply = CreateReply::default()
        .content(entry.content)
        .allowed_mentions(serenity::CreateAllowedMentions::new().empty_users().empty_roles());

    for path in &entry.attachments {
        reply = reply.attachment(serenity::CreateAttachment::path(path).await?);
    }

    ctx.send(reply).await?;

    Ok(())
}

pub async fn autocomplete_tag<'a>(
    ctx: Context<'a>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    ctx.data().tags.suggest(partial).into_iter()
}
