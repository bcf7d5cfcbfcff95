//! # List Command Module / 列表命令模块
//!
//! Prints the expanded session matrix. Selected sessions are marked `*`,
//! deselected ones `-`.
//!
//! 打印展开后的会话矩阵。被选中的会话标记为 `*`，未选中的标记为 `-`。

use anyhow::Result;
use colored::*;

use crate::commands::{ProjectArgs, load_project, print_project_banner};
use crate::core::models::SessionSpec;
use crate::core::planner::Selection;
use crate::infra::t;

/// One line of the listing.
/// 列表中的一行。
pub fn format_entry(session: &SessionSpec, selection: &Selection) -> String {
    let marker = if selection.matches(session) { "*" } else { "-" };
    format!("{} {} -> {}", marker, session.id(), session.kind.description())
}

pub fn execute(args: ProjectArgs) -> Result<()> {
    let project = load_project(&args)?;
    print_project_banner(&project);

    println!("\n{}", t!("list.header").bold());
    for session in &project.matrix {
        let line = format_entry(session, &args.selection);
        if args.selection.matches(session) {
            println!("{}", line.cyan());
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!("\n{}", t!("list.legend"));
    Ok(())
}
