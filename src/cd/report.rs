use crate::cd::error::CdError;
use crate::cd::group::GameGroup;
use crate::cd::health::{GroupState, classify_group};
use crate::util::indent;
use log::{info, warn};

/// Verdict for one group, rendered by whoever asked for it.
#[derive(Debug)]
pub struct GroupReport {
    pub name: String,
    pub state: Result<GroupState, CdError>,
}

impl GroupReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.state, Ok(GroupState::Ok))
    }

    pub fn status(&self) -> Option<GroupState> {
        self.state.as_ref().ok().copied()
    }

    pub fn diagnosis(&self) -> String {
        match &self.state {
            Ok(state) => state.diagnosis(&self.name),
            Err(err) => format!("{} could not be verified: {err}", self.name),
        }
    }

    /// `<state>\t<name>\t<diagnosis>`, the diagnosis is left empty for healthy groups.
    pub fn porcelain(&self) -> String {
        let state = match &self.state {
            Ok(state) => state.to_string(),
            Err(_) => "error".to_string(),
        };
        let diagnosis = if self.is_ok() {
            String::new()
        } else {
            self.diagnosis()
        };

        format!("{state}\t{}\t{diagnosis}", self.name)
    }
}

/// Classifies every group, a group that fails to classify does not stop the others.
pub async fn verify_groups(groups: &[GameGroup]) -> Vec<GroupReport> {
    let mut reports = Vec::with_capacity(groups.len());

    for group in groups {
        reports.push(GroupReport {
            name: group.display_name(),
            state: classify_group(group).await,
        });
    }

    reports
}

pub fn log_report(reports: &[GroupReport]) {
    let ok_count = reports.iter().filter(|report| report.is_ok()).count();

    info!(
        "There are {ok_count} Ok games and {} games with errors",
        reports.len() - ok_count
    );

    for report in reports.iter().filter(|report| report.is_ok()) {
        info!("{}", indent(&format!("[OK] {}", report.diagnosis()), 1));
    }

    for report in reports.iter().filter(|report| !report.is_ok()) {
        warn!("{}", indent(&format!("[ERROR] {}", report.diagnosis()), 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cd::group::scan_image_groups;

    #[tokio::test]
    async fn reports_keep_group_order_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in [
            ("A.cue", "FILE \"A.bin\" BINARY\n  TRACK 01 MODE1/2352\n"),
            ("A.bin", ""),
            ("B.cue", "TRACK 01 MODE1/2352\n"),
            ("B.bin", ""),
            ("C.iso", ""),
        ] {
            tokio::fs::write(dir.path().join(name), contents).await.unwrap();
        }

        let groups = scan_image_groups(dir.path(), None).await.unwrap();
        let reports = verify_groups(&groups).await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].status(), Some(GroupState::Ok));
        assert!(reports[1].state.is_err());
        assert_eq!(reports[2].status(), Some(GroupState::NoLayoutTrack));

        assert_eq!(reports[0].porcelain(), "ok\tA.bin\t");
        assert!(reports[1].porcelain().starts_with("error\tB.bin\tB.bin could not be verified"));
        assert!(reports[2].porcelain().starts_with("no-layout-track\tC.iso\tC.iso needs a layout file"));
    }
}
