use anyhow::Result as AnyResult;
use clap::{arg, value_parser, ArgMatches, Command};
use image::ImageFormat;
use mimalloc::MiMalloc;
use psview::{Machine, Recorder, SessionOptionBuilder};
use psview_render::{render_steps, RenderOptionBuilder};
use std::{
    io::{copy, read_to_string, stdin, stdout, BufWriter, Cursor, Write},
    path::PathBuf,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn file_arg() -> clap::Arg {
    arg!(-f <filename> "Script file, read stdin if not specified")
        .value_parser(value_parser!(PathBuf))
        .required(false)
}

fn steps_arg() -> clap::Arg {
    arg!(--steps <steps> "Stop after <steps> top level tokens").value_parser(value_parser!(usize))
}

fn cli() -> Command {
    Command::new("psview")
        .about("Run PostScript-like vector graphics scripts")
        .subcommand_required(true)
        .subcommand(
            Command::new("render")
                .about("render script to PNG, write to stdout")
                .arg(file_arg())
                .arg(arg!(--zoom <zoom> "Zoom factor, default: 1.0").value_parser(value_parser!(f32)))
                .arg(
                    arg!(--width <width> "Page width, default: 612")
                        .value_parser(value_parser!(u32)),
                )
                .arg(
                    arg!(--height <height> "Page height, default: 792")
                        .value_parser(value_parser!(u32)),
                )
                .arg(steps_arg()),
        )
        .subcommand(
            Command::new("trace")
                .about("execute script token by token, print operand stack after each token")
                .arg(file_arg())
                .arg(steps_arg())
                .arg(arg!(--calls "Print drawing surface calls instead of operand stack")),
        )
        .subcommand(
            Command::new("defs")
                .about("dump definition table")
                .arg(file_arg()),
        )
}

fn read_script(sub_m: &ArgMatches) -> AnyResult<String> {
    Ok(match sub_m.get_one::<PathBuf>("filename") {
        Some(path) => std::fs::read_to_string(path)?,
        None => read_to_string(stdin())?,
    })
}

fn render(sub_m: &ArgMatches) -> AnyResult<()> {
    let script = read_script(sub_m)?;
    let mut option = RenderOptionBuilder::new();
    if let Some(zoom) = sub_m.get_one::<f32>("zoom") {
        option = option.zoom(*zoom);
    }
    if let Some(width) = sub_m.get_one::<u32>("width") {
        option = option.width(*width);
    }
    if let Some(height) = sub_m.get_one::<u32>("height") {
        option = option.height(*height);
    }
    let rendered = render_steps(&script, option, sub_m.get_one::<usize>("steps").copied())?;
    for d in &rendered.diagnostics {
        eprintln!("{d}");
    }

    let mut buf = Cursor::new(vec![]);
    rendered.image.write_to(&mut buf, ImageFormat::Png)?;
    copy(&mut &buf.into_inner()[..], &mut BufWriter::new(&mut stdout()))?;
    Ok(())
}

fn trace(sub_m: &ArgMatches) -> AnyResult<()> {
    let script = read_script(sub_m)?;
    let show_calls = sub_m.get_one::<bool>("calls").copied().unwrap_or_default();
    let option = SessionOptionBuilder::new()
        .steps(sub_m.get_one::<usize>("steps").copied())
        .build();

    let mut out = BufWriter::new(stdout());
    let mut machine = Machine::with_option(&script, Recorder::new(), option);
    let mut reported = machine.diagnostics().len();
    let mut recorded = 0;
    while let Some(token) = machine.step() {
        writeln!(out, "#{} {}", token.pos, token.text)?;
        if show_calls {
            let calls = machine.surface().calls();
            for call in &calls[recorded..] {
                writeln!(out, "    {call:?}")?;
            }
            recorded = calls.len();
        } else {
            writeln!(out, "    {}", machine.stack())?;
        }
        for d in &machine.diagnostics()[reported..] {
            writeln!(out, "    error: {}", d.error)?;
        }
        reported = machine.diagnostics().len();
    }

    let report = machine.finish();
    writeln!(out, "stack: {}", report.stack)?;
    writeln!(out, "state: {:?}", report.state)?;
    for d in &report.diagnostics {
        writeln!(out, "{d}")?;
    }
    Ok(())
}

fn defs(sub_m: &ArgMatches) -> AnyResult<()> {
    let script = read_script(sub_m)?;
    let machine = Machine::new(&script, Recorder::new());
    let mut out = BufWriter::new(stdout());
    for (name, body) in machine.definitions().iter() {
        write!(out, "/{name} {{")?;
        for token in body.iter() {
            write!(out, " {}", token.text)?;
        }
        writeln!(out, " }}")?;
    }
    for d in machine.diagnostics() {
        eprintln!("{d}");
    }
    Ok(())
}

fn main() -> AnyResult<()> {
    env_logger::init();

    match cli().get_matches().subcommand() {
        Some(("render", sub_m)) => render(sub_m),
        Some(("trace", sub_m)) => trace(sub_m),
        Some(("defs", sub_m)) => defs(sub_m),
        _ => unreachable!("subcommand is required"),
    }
}
