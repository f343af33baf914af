use crate::http::{ResolvedRequest, Response};
use crate::runner::types::{ChainReport, StepObserver, StepResult};
use crate::utils::{ResponseFormat, ResponseFormatter, status_color};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

pub struct ChainReporter {
    verbose: bool,
    formatter: ResponseFormatter,
}

impl ChainReporter {
    pub fn new(verbose: bool) -> Self {
        let format = if verbose {
            ResponseFormat::Verbose
        } else {
            ResponseFormat::Compact
        };

        Self {
            verbose,
            formatter: ResponseFormatter::new(format),
        }
    }

    /// 打印链开始
    pub fn print_header(&self, chain: &str, step_count: usize) {
        println!(
            "\nRunning chain {} ({} steps defined)...\n",
            chain.bold(),
            step_count
        );
    }

    /// 打印单个步骤的执行进度
    pub fn print_step(&self, result: &StepResult, response: &Response) {
        println!("{}", self.render_step(result, response));
    }

    /// 渲染单个步骤，分支中的步骤按深度缩进
    ///
    /// verbose 模式或断言失败时附带格式化后的响应。
    pub fn render_step(&self, result: &StepResult, response: &Response) -> String {
        let indent = "  ".repeat(result.depth);
        let mark = if result.passed() {
            "✓".green()
        } else {
            "✗".red()
        };

        let mut lines = vec![format!(
            "{}{} {} {} {} {} ({}ms)",
            indent,
            mark,
            result.request.bold(),
            result.method.to_string().cyan(),
            result.url,
            response.status.code().to_string().color(status_color(&response.status)),
            result.duration.as_millis()
        )];

        if self.verbose {
            for name in &result.extracted {
                lines.push(format!("{}    {} {}", indent, "extracted".dimmed(), name));
            }
            for assertion in &result.assertions {
                lines.push(format!(
                    "{}    {} '{}' {} '{}'",
                    indent,
                    "✓".green(),
                    assertion.left,
                    assertion.op,
                    assertion.right
                ));
            }
        }
        if let Some(failure) = &result.failure {
            lines.push(format!("{}    {} {}", indent, "✗".red(), failure.red()));
        }

        if self.verbose || !result.passed() {
            let body = self.formatter.format(response);
            for line in body.lines() {
                lines.push(format!("{}    {}", indent, line));
            }
        }

        if result.branched {
            lines.push(format!("{}  {} on_status {}", indent, "↳".dimmed(), result.status));
        }

        lines.join("\n")
    }

    /// 打印链执行摘要
    pub fn print_summary(&self, report: &ChainReport) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["#", "Request", "Method", "URL", "Status", "Duration"]);

        for (i, step) in report.steps.iter().enumerate() {
            let color = match step.status {
                200..=399 => Color::Green,
                400..=499 => Color::Yellow,
                _ => Color::Red,
            };
            let name = format!("{}{}", "  ".repeat(step.depth), step.request);

            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(name),
                Cell::new(step.method),
                Cell::new(&step.url).add_attribute(Attribute::Dim),
                Cell::new(step.status).fg(color),
                Cell::new(format!("{}ms", step.duration.as_millis())),
            ]);
        }

        println!("\n{}", table);
        println!(
            "  {}: {} requests, {} assertions passed, {:.3}s",
            report.chain.bold(),
            report.request_count().to_string().green(),
            report.assertion_count().to_string().green(),
            report.total_duration().as_secs_f64()
        );
        println!();
    }

    /// 打印单个请求的响应
    pub fn print_response(&self, request: &ResolvedRequest, response: &Response) {
        if self.verbose {
            println!("{} {}", request.method.to_string().cyan(), request.url);
        }
        println!("{}", self.formatter.format(response));
    }
}

impl StepObserver for ChainReporter {
    fn on_step(&self, result: &StepResult, response: &Response) {
        self.print_step(result, response);
    }
}

impl Default for ChainReporter {
    fn default() -> Self {
        Self::new(false)
    }
}
