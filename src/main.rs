use bookfuse::{Epub, MergeConfig, Result, combine, scan_for_issues};
use clap::Parser;

/// 📚 BookFuse - EPUB文件合并工具
#[derive(Parser)]
#[command(name = "bookfuse")]
#[command(about = "一个用于合并EPUB文件的Rust工具")]
#[command(version)]
struct Args {
    /// 基础EPUB文件路径
    #[arg(help = "作为合并基础的EPUB文件路径")]
    base: String,

    /// 要追加的EPUB文件路径
    #[arg(required = true, help = "按顺序追加到基础文件之后的EPUB文件路径")]
    appendages: Vec<String>,

    /// 输出文件路径
    #[arg(short, long, default_value = "merged.epub", help = "合并结果的输出路径")]
    output: String,

    /// 详细输出模式
    #[arg(short, long, help = "显示详细信息")]
    verbose: bool,

    /// 跳过合并后的质量检查
    #[arg(long, help = "不检查疑似重复页面和疑似空白页面")]
    skip_check: bool,

    /// 质量检查配置文件路径
    #[arg(short, long, default_value = "merge.yaml", help = "质量检查配置文件路径，不存在时使用内置默认值")]
    config: String,
}

fn main() {
    let args = Args::parse();

    println!("📚 BookFuse - EPUB合并工具");

    if args.verbose {
        println!("🔍 详细模式已启用");
    }

    match process_merge(&args) {
        Ok(_) => println!("🎉 合并完成: {}", args.output),
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            std::process::exit(1);
        }
    }
}

fn process_merge(args: &Args) -> Result<()> {
    println!("正在读取基础文件: {}", args.base);
    let mut base = Epub::from_path(&args.base)?;

    if args.verbose {
        println!("  清单项目: {} 个", base.manifest.len());
        println!("  脊柱项目: {} 个", base.spine.len());
    }

    for path in &args.appendages {
        println!("正在追加: {}", path);
        let appendage = Epub::from_path(path)?;
        combine(&mut base, &appendage)?;

        if args.verbose {
            println!("  合并后清单项目: {} 个", base.manifest.len());
        }
    }

    if !args.skip_check {
        check_quality(&base, &args.config)?;
    }

    println!("正在写入输出文件: {}", args.output);
    base.write_to_path(&args.output)?;

    Ok(())
}

/// 合并后的质量检查，发现问题只提示不中止
fn check_quality(epub: &Epub, config_path: &str) -> Result<()> {
    let config = if std::path::Path::new(config_path).exists() {
        MergeConfig::from_path(config_path)?
    } else {
        MergeConfig::default_config()
    };

    println!("\n🔎 质量检查:");
    let issues = scan_for_issues(epub, &config);
    if issues.is_empty() {
        println!("  未发现问题");
    } else {
        for issue in &issues {
            println!("  ⚠️  {}", issue);
        }
        println!("  共发现 {} 个疑似问题，请人工确认", issues.len());
    }

    Ok(())
}
