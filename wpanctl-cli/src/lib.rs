use colored::*;
use wpanctl::attr::{DeviceAddress, KeyMode};
use wpanctl::scan::{ActiveScanStatus, PanDescriptor, ScanResult};
use wpanctl::security::{KeyId, KeyTable, SecurityKeyEntry, SecurityParams};
use wpanctl::{Registry, Report};

struct Writer<'b> {
    buffer: &'b mut String,
    indent: usize,
}

impl<'b> Writer<'b> {
    fn new(buffer: &'b mut String) -> Self {
        Self { buffer, indent: 0 }
    }

    fn increase_indent(&mut self) {
        self.indent += 2;
    }

    fn decrease_indent(&mut self) {
        self.indent -= 2;
    }

    fn write(&mut self, s: String) {
        self.buffer.push_str(&" ".repeat(self.indent));
        self.buffer.push_str(&s);
    }

    fn writeln(&mut self, s: String) {
        self.write(s);
        self.buffer.push('\n');
    }

    fn heading(&mut self, title: &str) {
        self.writeln(title.underline().bold().to_string());
    }

    fn field(&mut self, name: &str, value: impl core::fmt::Display) {
        self.writeln(format!("{}: {}", name.bold(), value));
    }

    fn optional(&mut self, name: &str, value: Option<impl core::fmt::Display>) {
        if let Some(value) = value {
            self.field(name, value);
        }
    }
}

/// Renders [`Report`]s for the terminal.
pub struct ReportPrinter {}

impl ReportPrinter {
    /// Render every report, in order.
    pub fn render_all(reports: &[Report]) -> String {
        reports.iter().map(Self::render).collect()
    }

    pub fn render(report: &Report) -> String {
        let mut buffer = String::new();
        let mut w = Writer::new(&mut buffer);

        match report {
            // Success is silent.
            Report::Ack => {}
            Report::AssociationConfirm { short_addr, status } => {
                w.heading("Association Confirm");
                w.increase_indent();
                w.field("short addr", DeviceAddress::Short(*short_addr));
                w.field("status", status);
                w.decrease_indent();
            }
            Report::DisassociationConfirm {
                status,
                pan_id,
                address,
            } => {
                w.heading("Disassociation Confirm");
                w.increase_indent();
                w.field("status", status);
                w.field("pan id", format!("0x{pan_id:04x}"));
                w.field("addr mode", address.mode());
                w.field("addr", address);
                w.decrease_indent();
            }
            Report::EdScan(result) => ed_scan(&mut w, result),
            Report::Beacon(pd) => pan_descriptor(&mut w, pd),
            Report::ActiveScanConfirm(status) => active_scan_confirm(&mut w, status),
            Report::BeaconNotify { sequence_number } => {
                w.heading("Beacon Notify");
                w.increase_indent();
                w.field("BSN", sequence_number);
                w.decrease_indent();
            }
            Report::SecurityParams(params) => security_params(&mut w, params),
            Report::KeyTable(table) => key_table(&mut w, table),
        }

        buffer
    }

    /// Render the usage of every registered command.
    pub fn render_commands(registry: &Registry) -> String {
        let mut buffer = String::new();
        let mut w = Writer::new(&mut buffer);

        w.heading("Commands");
        w.increase_indent();
        for command in registry.iter() {
            w.writeln(command.to_string());
        }
        w.decrease_indent();

        buffer
    }
}

fn ed_scan(w: &mut Writer, result: &ScanResult) {
    w.heading("ED Scan");
    w.increase_indent();
    w.field("status", result.status);
    w.field("scan type", result.scan_type);
    w.field("page", result.page);
    w.field("channels", format!("0x{:08x}", result.channels));
    w.field("result list size", result.result_list_size);
    w.writeln(format!("{}", "energies".italic()));
    w.increase_indent();
    for (channel, level) in &result.energies {
        w.field(&format!("channel {channel}"), level);
    }
    w.decrease_indent();
    w.field("detected category", result.detected_category);
    w.decrease_indent();
}

fn pan_descriptor(w: &mut Writer, pd: &PanDescriptor) {
    w.heading("PAN Descriptor");
    w.increase_indent();
    w.optional("src addr mode", pd.src_addr_mode);
    w.optional("src pan id", pd.src_pan_id.map(|id| format!("0x{id:04x}")));
    w.optional("src addr", pd.src_addr);
    w.optional("channel", pd.channel);
    w.optional("page", pd.page);
    w.optional(
        "superframe spec",
        pd.superframe_spec.map(|spec| format!("0x{spec:02x}")),
    );
    w.optional(
        "gts permit",
        pd.gts_permit.map(|gts| if gts { "TRUE" } else { "FALSE" }),
    );
    w.optional("lqi", pd.lqi);
    w.optional("timestamp", pd.timestamp);
    w.optional("sec status", pd.sec_status);
    w.optional("sec level", pd.sec_level);
    w.optional("key id mode", pd.key_id_mode);
    w.optional("key source", pd.key_source);
    w.optional("key index", pd.key_index);
    w.decrease_indent();
}

fn active_scan_confirm(w: &mut Writer, status: &ActiveScanStatus) {
    w.heading("Active Scan Confirm");
    w.increase_indent();
    w.field("status", status.status);
    w.field("scan type", status.scan_type);
    w.field("page", status.page);
    w.field("detected category", status.detected_category);
    w.field("result list size", status.result_list_size);
    w.decrease_indent();
}

fn key_mode_name(mode: KeyMode) -> &'static str {
    match mode {
        KeyMode::Implicit => "implicit",
        KeyMode::Index => "index",
        KeyMode::ShortIndex => "short index",
        KeyMode::ExtendedIndex => "extended index",
    }
}

fn key_id(w: &mut Writer, key_id: &KeyId) {
    w.field("key mode", key_mode_name(key_id.mode()));
    match *key_id {
        KeyId::Implicit { pan_id, address } => {
            w.optional("pan id", pan_id.map(|id| format!("0x{id:04x}")));
            w.optional("addr", address);
        }
        KeyId::Index { index } => {
            w.optional("index", index);
        }
        KeyId::ShortIndex { index, source } => {
            w.optional("index", index);
            w.optional("source", source.map(|s| format!("0x{s:08x}")));
        }
        KeyId::ExtendedIndex { index, source } => {
            w.optional("index", index);
            w.optional("source", source.map(|s| format!("0x{s:016x}")));
        }
    }
}

fn security_params(w: &mut Writer, params: &SecurityParams) {
    w.heading("Security Parameters");
    w.increase_indent();
    w.optional("enabled", params.enabled.map(|e| e as u8));
    if let Some(id) = &params.key_id {
        key_id(w, id);
    }
    w.optional("seclevel", params.seclevel);
    w.optional("frame counter", params.frame_counter);
    w.decrease_indent();
}

fn key_entry(w: &mut Writer, n: usize, entry: &SecurityKeyEntry) {
    w.writeln(format!("{}", format!("key {n}").italic()));
    w.increase_indent();
    key_id(w, &entry.key_id);
    w.optional(
        "frame types",
        entry.frame_types.map(|types| format!("0x{types:x}")),
    );
    w.optional("key", entry.key.map(hex::encode));
    w.decrease_indent();
}

fn key_table(w: &mut Writer, table: &KeyTable) {
    match table.phy {
        Some(phy) => w.heading(&format!("phy#{phy}")),
        None => w.heading("Keys"),
    }
    w.increase_indent();
    w.optional("Interface", table.ifname.as_deref());
    w.optional("ifindex", table.ifindex);
    w.optional("wpan_dev", table.wpan_dev.map(|dev| format!("0x{dev:x}")));
    for (n, entry) in table.entries.iter().enumerate() {
        key_entry(w, n, entry);
    }
    w.decrease_indent();
}
