use crate::cd::error::{CdError, CdResult};
use crate::cd::fix::{FixOutcome, fix_group};
use crate::cd::format::ImageFormat;
use crate::cd::group::{GameGroup, scan_image_groups};
use crate::cd::pick::{BestPick, pick_best};
use crate::cd::report::{GroupReport, log_report, verify_groups};
use crate::chd::chdman::ChdmanTools;
use crate::chd::{ConvertOutcome, DiscConverter, convert_pick};
use crate::commands::cd::{CdSource, ToChdCommand, VerifyCommand};
use crate::util::indent;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub mod cue;
pub mod error;
pub mod fix;
pub mod format;
pub mod group;
pub mod health;
pub mod pick;
pub mod report;

/// Builds the groups of a source folder, or the one group holding a single image.
pub async fn collect_groups(source: &CdSource) -> CdResult<Vec<GameGroup>> {
    if let Some(image) = &source.cd_image {
        return collect_image_group(image).await.map(|group| vec![group]);
    }

    let folder = source.source_folder.as_deref().unwrap_or(Path::new("."));

    info!("Generating image file groups...");
    scan_image_groups(folder, None).await
}

async fn collect_image_group(image: &Path) -> CdResult<GameGroup> {
    if !tokio::fs::try_exists(image).await? {
        return Err(CdError::ImageNotFound(image.to_path_buf()));
    }

    info!("Generating image file group...");

    let image = std::path::absolute(image)?;
    let folder = image.parent().unwrap_or(Path::new("."));
    let stem = image
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    scan_image_groups(folder, Some(&stem))
        .await?
        .into_iter()
        .find(|group| group.contains(&image))
        .ok_or(CdError::NoGroupForImage(image))
}

pub async fn convert_cd_images(pb: MultiProgress, cmd: ToChdCommand) -> anyhow::Result<()> {
    let converter = ChdmanTools::resolve(cmd.chdman.clone(), cmd.ccd2cue.clone());

    debug!("Using {converter:?}");

    let groups = collect_groups(&cmd.source).await?;

    info!("Verifying cd images...");
    let reports = verify_groups(&groups).await;

    info!("Groups report...");
    log_report(&reports);

    let picks = pick_healthy(&groups, &reports).await;

    info!("Converting cd images...");
    convert_picks(&converter, pb, &picks, &cmd).await
}

async fn pick_healthy<'a>(
    groups: &'a [GameGroup],
    reports: &[GroupReport],
) -> Vec<(&'a GameGroup, BestPick)> {
    let mut picks = Vec::new();

    for (group, report) in groups.iter().zip(reports) {
        if !report.is_ok() {
            warn!("{}", indent(&format!("Skipping {} game...", report.name), 1));
            continue;
        }

        match pick_best(group).await {
            Ok(Some(pick)) => picks.push((group, pick)),
            Ok(None) => warn!(
                "{}",
                indent(
                    &format!("No convertible file found for {}, skipping...", report.name),
                    1
                )
            ),
            Err(err) => error!("{}", indent(&format!("{}: {err}", report.name), 1)),
        }
    }

    picks
}

async fn convert_picks<C: DiscConverter>(
    converter: &C,
    pb: MultiProgress,
    picks: &[(&GameGroup, BestPick)],
    cmd: &ToChdCommand,
) -> anyhow::Result<()> {
    let bar = pb.add(ProgressBar::new(picks.len() as u64));
    bar.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40} {pos}/{len} {msg}",
    )?);

    let (mut converted, mut skipped, mut failed) = (0usize, 0usize, 0usize);

    for (group, pick) in picks {
        let name = group.display_name();
        bar.set_message(name.clone());

        info!("{}", indent(&format!("Converting {name}..."), 1));

        match convert_pick(converter, pick, &cmd.output_folder, cmd.force).await {
            Ok(ConvertOutcome::Converted { chd, generated }) => {
                converted += 1;
                info!("{}", indent(&format!("Wrote {}", chd.display()), 1));

                if cmd.delete_original {
                    if let Err(err) = remove_group_files(group, &generated).await {
                        error!("{}", indent(&format!("Could not delete {name}: {err}"), 1));
                    }
                }
            }
            Ok(ConvertOutcome::ExportedBefore(_)) => {
                skipped += 1;
                info!(
                    "{}",
                    indent(
                        &format!("{name} game found in output folder. It won't be exported again"),
                        1
                    )
                );
            }
            Err(err) => {
                failed += 1;
                error!("{}", indent(&format!("{name} could not be converted: {err}"), 1));
            }
        }

        bar.inc(1);
    }

    bar.finish_and_clear();

    info!("Converted {converted} games, skipped {skipped}, {failed} failed");

    Ok(())
}

/// Deletes the group, the files generated while converting it and the
/// ancillary `.sub` files sharing a stem with its members.
async fn remove_group_files(group: &GameGroup, generated: &[PathBuf]) -> CdResult<()> {
    let mut files: BTreeSet<PathBuf> = group.files().iter().cloned().collect();
    files.extend(generated.iter().cloned());

    for file in group.files() {
        let sidecar = file.with_extension(ImageFormat::Sub.extension());
        if tokio::fs::try_exists(&sidecar).await? {
            files.insert(sidecar);
        }
    }

    for file in files {
        debug!("Deleting {file:?}");

        match tokio::fs::remove_file(&file).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

pub async fn verify_cd_layouts(cmd: VerifyCommand) -> anyhow::Result<()> {
    let groups = collect_groups(&cmd.source).await?;

    info!("Verifying cd images...");
    let reports = verify_groups(&groups).await;

    if cmd.porcelain {
        for report in &reports {
            println!("{}", report.porcelain());
        }
    } else {
        info!("Groups report...");
        log_report(&reports);
    }

    let has_problems = reports.iter().any(|report| !report.is_ok());

    if cmd.fix && has_problems {
        info!("Fixing problems...");
        fix_groups(&groups, &reports).await;
    }

    Ok(())
}

async fn fix_groups(groups: &[GameGroup], reports: &[GroupReport]) {
    for (group, report) in groups.iter().zip(reports) {
        let Some(state) = report.status().filter(|state| !state.is_ok()) else {
            continue;
        };
        let name = &report.name;

        match fix_group(group, state).await {
            Ok(FixOutcome::Repointed { layout, data_file }) => info!(
                "{}",
                indent(
                    &format!(
                        "Fixed {name}: {} now points to {}",
                        file_name(&layout),
                        file_name(&data_file)
                    ),
                    1
                )
            ),
            Ok(FixOutcome::Generated { layout }) => info!(
                "{}",
                indent(&format!("Generated {} for {name}", file_name(&layout)), 1)
            ),
            Ok(FixOutcome::LayoutNotFixable(layout)) => info!(
                "{}",
                indent(
                    &format!(
                        "Only .cue layout files can be fixed. So {} will stay the same",
                        file_name(&layout)
                    ),
                    1
                )
            ),
            Ok(FixOutcome::Unrecoverable) => warn!(
                "{}",
                indent(
                    &format!("Game {name} SKIPPED because it has unrecoverable errors (see report)"),
                    1
                )
            ),
            Ok(FixOutcome::NothingToFix) => {}
            Err(err) => error!("{}", indent(&format!("Could not fix {name}: {err}"), 1)),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
